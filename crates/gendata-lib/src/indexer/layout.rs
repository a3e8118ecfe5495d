use crate::builder::extractor::datapack_overlays;
use crate::indexer::ids::CanonicalId;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The extracted tree plus its datapack overlays. Overlay roots mirror the
/// primary layout (`<overlay>/data/minecraft/...`).
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
    overlays: Vec<PathBuf>,
}

impl DataLayout {
    pub fn open(root: &Path) -> Result<Self> {
        let overlays = datapack_overlays(root)?;
        if !overlays.is_empty() {
            log::debug!("Datapack overlays: {:?}", overlays);
        }
        Ok(Self {
            root: root.to_path_buf(),
            overlays,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Primary root first, then overlays in name order
    pub fn roots(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.root.as_path()).chain(self.overlays.iter().map(PathBuf::as_path))
    }

    /// First candidate directory present in the primary tree
    pub fn resolve_first<'a>(&self, candidates: &[&'a str]) -> Option<&'a str> {
        candidates
            .iter()
            .copied()
            .find(|dir| self.root.join(dir).is_dir())
    }

    /// Ids of every `*.<extension>` file under `relative` across all roots
    pub fn collect_ids(&self, relative: &str, extension: &str) -> Result<BTreeSet<CanonicalId>> {
        let mut ids = BTreeSet::new();
        for root in self.roots() {
            ids.extend(ids_under(&root.join(relative), extension)?);
        }
        Ok(ids)
    }
}

/// Files with `extension` below `dir` as `(relative path, absolute path)`,
/// in file-name order. A missing directory yields nothing.
pub fn files_under(dir: &Path, extension: &str) -> Result<Vec<(String, PathBuf)>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Walk {:?}", dir))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        let relative = path
            .strip_prefix(dir)?
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push((relative, path.to_path_buf()));
    }
    Ok(files)
}

pub fn ids_under(dir: &Path, extension: &str) -> Result<BTreeSet<CanonicalId>> {
    Ok(files_under(dir, extension)?
        .into_iter()
        .map(|(relative, _)| CanonicalId::from_file_name(&relative))
        .collect())
}

/// Immediate subdirectory names of `dir`, sorted
pub fn subdirectories(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("Read dir {:?}", dir))? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}
