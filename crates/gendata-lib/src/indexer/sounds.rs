use crate::builder::config::SOUNDS_FILES;
use crate::builder::error::BuildError;
use crate::indexer::ids::{flatten, CanonicalId};
use crate::indexer::read_report;
use crate::indexer::writer::IndexWriter;
use anyhow::Result;
use serde_json::Value;
use std::path::Path;

/// Sound event groups from the first sounds file present
pub fn index_sounds(root: &Path, writer: &mut IndexWriter) -> Result<usize> {
    let Some(file) = SOUNDS_FILES.iter().find(|f| root.join(f).is_file()) else {
        log::debug!("No sounds.json in tree");
        return Ok(0);
    };
    let Some(report) = read_report(root, file)? else {
        return Ok(0);
    };
    let Some(groups) = report.as_object() else {
        return Err(BuildError::structural("sounds", *file, "not an object").into());
    };

    for (key, group) in groups {
        let name = flatten(key);
        writer.write_json(&format!("sounds/{}.json", name), group)?;

        let mut lines = Vec::new();
        if let Some(sounds) = group.get("sounds").and_then(Value::as_array) {
            for sound in sounds {
                let sound_name = match sound {
                    Value::String(s) => Some(s.as_str()),
                    Value::Object(obj) => obj.get("name").and_then(Value::as_str),
                    _ => None,
                }
                .ok_or_else(|| BuildError::structural("sound", key.as_str(), "entry without name"))?;
                lines.push(CanonicalId::parse(sound_name).to_string());
            }
        }
        writer.write_lines(&format!("sounds/{}.txt", name), &lines)?;
    }

    log::debug!("{} sound events from {}", groups.len(), file);
    Ok(groups.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn first_file_wins_and_names_are_canonical() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("assets/minecraft")).unwrap();
        fs::write(
            root.join("assets/minecraft/sounds.json"),
            r#"{"ambient.cave": {"sounds": ["ambient/cave/cave1", {"name": "mymod:cave2", "weight": 2}]},
                "music.menu": {"category": "music"}}"#,
        )
        .unwrap();
        fs::write(root.join("assets/sounds.json"), r#"{"legacy": {"sounds": ["x"]}}"#).unwrap();

        let mut writer = IndexWriter::new(root);
        assert_eq!(index_sounds(root, &mut writer).unwrap(), 2);
        assert_eq!(
            fs::read_to_string(root.join("lists/sounds/ambient.cave.txt")).unwrap(),
            "minecraft:ambient/cave/cave1\nmymod:cave2\n"
        );
        assert!(root.join("lists/sounds/music.menu.json").exists());
        assert!(!root.join("lists/sounds/music.menu.txt").exists());
        assert!(!root.join("lists/sounds/legacy.json").exists());
    }
}
