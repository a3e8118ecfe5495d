use crate::builder::config::LISTS_DIR;
use crate::indexer::ids::CanonicalId;
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Sink for everything under `lists/`. Each target is written at most once
/// per run; a second write to the same target is an error.
pub struct IndexWriter {
    lists_root: PathBuf,
    written: HashSet<String>,
}

impl IndexWriter {
    pub fn new(root: &Path) -> Self {
        Self {
            lists_root: root.join(LISTS_DIR),
            written: HashSet::new(),
        }
    }

    /// Number of files written so far
    pub fn written(&self) -> usize {
        self.written.len()
    }

    /// Write `lines`, one per line with a trailing newline. Empty input
    /// writes nothing.
    pub fn write_lines<S: AsRef<str>>(&mut self, relative: &str, lines: &[S]) -> Result<bool> {
        if lines.is_empty() {
            return Ok(false);
        }
        let mut body = String::new();
        for line in lines {
            body.push_str(line.as_ref());
            body.push('\n');
        }
        self.write(relative, body.as_bytes())?;
        Ok(true)
    }

    pub fn write_json<T: Serialize + ?Sized>(&mut self, relative: &str, value: &T) -> Result<()> {
        let mut body = serde_json::to_string_pretty(value)
            .with_context(|| format!("Serialize {}", relative))?;
        body.push('\n');
        self.write(relative, body.as_bytes())
    }

    fn write(&mut self, relative: &str, body: &[u8]) -> Result<()> {
        if !self.written.insert(relative.to_string()) {
            bail!("Index target written twice: {}", relative);
        }
        let path = self.lists_root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("Create {:?}", parent))?;
        }
        fs::write(&path, body).with_context(|| format!("Write {:?}", path))?;
        log::trace!("wrote {:?}", path);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Listing {
    entries: BTreeSet<CanonicalId>,
    tags: BTreeSet<CanonicalId>,
}

/// Entry/tag listings keyed by target file. Several categories may feed the
/// same target; everything is merged before the single flush.
#[derive(Debug, Default)]
pub struct Listings {
    targets: BTreeMap<String, Listing>,
}

impl Listings {
    pub fn add_entries(&mut self, target: &str, ids: impl IntoIterator<Item = CanonicalId>) {
        self.targets
            .entry(target.to_string())
            .or_default()
            .entries
            .extend(ids);
    }

    pub fn add_tags(&mut self, target: &str, ids: impl IntoIterator<Item = CanonicalId>) {
        self.targets
            .entry(target.to_string())
            .or_default()
            .tags
            .extend(ids);
    }

    /// Sorted entries followed by sorted `#`-tags
    pub fn lines(&self, target: &str) -> Vec<String> {
        self.targets
            .get(target)
            .map(|listing| {
                listing
                    .entries
                    .iter()
                    .map(|id| id.to_string())
                    .chain(listing.tags.iter().map(CanonicalId::to_tag))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn flush(self, writer: &mut IndexWriter) -> Result<usize> {
        let mut count = 0;
        for target in self.targets.keys() {
            if writer.write_lines(target, &self.lines(target))? {
                count += 1;
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_before_tags() {
        let mut listings = Listings::default();
        listings.add_tags("block.txt", [CanonicalId::parse("mytag")]);
        listings.add_entries("block.txt", [CanonicalId::parse("minecraft:stone")]);
        assert_eq!(
            listings.lines("block.txt"),
            vec!["minecraft:stone", "#minecraft:mytag"]
        );
    }

    #[test]
    fn merged_targets_are_written_once() {
        let tmp = tempfile::tempdir().unwrap();
        let mut writer = IndexWriter::new(tmp.path());
        let mut listings = Listings::default();
        listings.add_entries("worldgen/biome.txt", [CanonicalId::parse("plains")]);
        listings.add_entries(
            "worldgen/biome.txt",
            [CanonicalId::parse("desert"), CanonicalId::parse("plains")],
        );
        listings.add_entries("empty.txt", Vec::<CanonicalId>::new());

        assert_eq!(listings.flush(&mut writer).unwrap(), 1);
        assert_eq!(
            fs::read_to_string(tmp.path().join("lists/worldgen/biome.txt")).unwrap(),
            "minecraft:desert\nminecraft:plains\n"
        );
        assert!(!tmp.path().join("lists/empty.txt").exists());
    }

    #[test]
    fn second_write_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let mut writer = IndexWriter::new(tmp.path());
        writer.write_json("blocks/stone.json", &serde_json::json!({})).unwrap();
        assert!(writer.write_json("blocks/stone.json", &serde_json::json!({})).is_err());
        assert_eq!(writer.written(), 1);
    }
}
