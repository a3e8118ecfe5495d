//! Loot table listings.
//!
//! Every pool contributes one line per member followed by a blank line. Pools
//! either carry `items` (item ids) or `entries`, whose members are decoded
//! into [`LootEntry`] before rendering.

use crate::builder::config::LOOT_TABLE_DIRS;
use crate::builder::error::BuildError;
use crate::indexer::ids::CanonicalId;
use crate::indexer::layout::{files_under, DataLayout};
use crate::indexer::writer::IndexWriter;
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LootEntry {
    Empty,
    Item(CanonicalId),
    Tag(CanonicalId),
    Table(CanonicalId),
}

impl LootEntry {
    pub fn parse(table: &str, entry: &Value) -> Result<Self, BuildError> {
        let kind = entry
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| BuildError::structural("loot table", table, "entry without type"))?;
        let kind_id = CanonicalId::parse(kind);
        if kind_id.namespace() != "minecraft" {
            return Err(unknown(table, kind));
        }

        let name = || {
            entry
                .get("name")
                .or_else(|| entry.get("value"))
                .and_then(Value::as_str)
                .map(CanonicalId::parse)
                .ok_or_else(|| {
                    BuildError::structural(
                        "loot table",
                        table,
                        format!("{} entry without name", kind_id),
                    )
                })
        };

        match kind_id.path() {
            "empty" => Ok(LootEntry::Empty),
            "item" => Ok(LootEntry::Item(name()?)),
            "tag" => Ok(LootEntry::Tag(name()?)),
            "loot_table" => Ok(LootEntry::Table(name()?)),
            _ => Err(unknown(table, kind)),
        }
    }

    pub fn render(&self) -> String {
        match self {
            LootEntry::Empty => CanonicalId::parse("empty").to_string(),
            LootEntry::Item(id) => id.to_string(),
            LootEntry::Tag(id) => id.to_tag(),
            LootEntry::Table(id) => format!("loot_table[]{}", id),
        }
    }
}

fn unknown(table: &str, kind: &str) -> BuildError {
    BuildError::UnknownEntryKind {
        table: table.to_string(),
        kind: kind.to_string(),
    }
}

/// Lines for one table: pool members, a blank line after each pool,
/// trailing blank lines trimmed.
pub fn table_lines(name: &str, table: &Value) -> Result<Vec<String>, BuildError> {
    let mut lines = Vec::new();
    let pools = match table.get("pools") {
        None => &[][..],
        Some(Value::Array(pools)) => pools.as_slice(),
        Some(_) => return Err(BuildError::structural("loot table", name, "pools is not a list")),
    };

    for pool in pools {
        if let Some(items) = pool.get("items") {
            for item in members(name, items)? {
                let id = item.get("item").and_then(Value::as_str).unwrap_or("empty");
                lines.push(CanonicalId::parse(id).to_string());
            }
        } else if let Some(entries) = pool.get("entries") {
            for entry in members(name, entries)? {
                lines.push(LootEntry::parse(name, entry)?.render());
            }
        } else {
            return Err(BuildError::structural(
                "loot table",
                name,
                "pool has neither items nor entries",
            ));
        }
        lines.push(String::new());
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    Ok(lines)
}

fn members<'a>(name: &str, value: &'a Value) -> Result<&'a [Value], BuildError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| BuildError::structural("loot table", name, "pool members are not a list"))
}

/// Table name → file, overlays replacing primary tables of the same name
pub fn collect_tables(layout: &DataLayout, excluded: &[String]) -> Result<BTreeMap<String, PathBuf>> {
    let Some(dir) = layout.resolve_first(LOOT_TABLE_DIRS) else {
        return Ok(BTreeMap::new());
    };

    let mut tables = BTreeMap::new();
    for root in layout.roots() {
        for (relative, path) in files_under(&root.join(dir), "json")? {
            if relative == "empty.json" {
                continue;
            }
            let name = CanonicalId::from_file_name(&relative).path().to_string();
            if excluded.iter().any(|prefix| name.starts_with(prefix.as_str())) {
                continue;
            }
            tables.insert(name, path);
        }
    }
    Ok(tables)
}

pub fn index_loot_tables(
    layout: &DataLayout,
    excluded: &[String],
    writer: &mut IndexWriter,
) -> Result<usize> {
    let tables = collect_tables(layout, excluded)?;
    let mut written = 0;
    for (name, path) in &tables {
        let data = fs::read(path).with_context(|| format!("Read loot table {:?}", path))?;
        let table: Value = serde_json::from_slice(&data)
            .with_context(|| format!("Parse loot table {:?}", path))?;
        let lines = table_lines(name, &table)?;
        if writer.write_lines(&format!("loot_tables/{}.txt", name), &lines)? {
            written += 1;
        }
    }
    log::debug!("{} of {} loot tables listed", written, tables.len());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::config::DATAPACKS_DIR;
    use serde_json::json;
    use std::path::Path;

    #[test]
    fn items_pool() {
        let table = json!({"pools": [{"items": [{"item": "stone"}, {"item": "minecraft:dirt"}]}]});
        assert_eq!(
            table_lines("t", &table).unwrap(),
            vec!["minecraft:stone", "minecraft:dirt"]
        );
    }

    #[test]
    fn entries_pools_are_separated() {
        let table = json!({"pools": [
            {"entries": [
                {"type": "minecraft:item", "name": "minecraft:bone"},
                {"type": "empty"},
                {"type": "minecraft:tag", "name": "arrows"}
            ]},
            {"entries": [{"type": "minecraft:loot_table", "value": "minecraft:chests/extra"}]}
        ]});
        assert_eq!(
            table_lines("t", &table).unwrap(),
            vec![
                "minecraft:bone",
                "minecraft:empty",
                "#minecraft:arrows",
                "",
                "loot_table[]minecraft:chests/extra"
            ]
        );
    }

    #[test]
    fn unknown_entry_kind_names_table_and_kind() {
        let table = json!({"pools": [{"entries": [{"type": "minecraft:alternatives"}]}]});
        match table_lines("chests/x", &table).unwrap_err() {
            BuildError::UnknownEntryKind { table, kind } => {
                assert_eq!(table, "chests/x");
                assert_eq!(kind, "minecraft:alternatives");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn pool_without_members_is_structural() {
        let table = json!({"pools": [{"rolls": 1}]});
        assert!(matches!(
            table_lines("t", &table),
            Err(BuildError::StructuralError { .. })
        ));
        assert!(table_lines("t", &json!({})).unwrap().is_empty());
    }

    fn touch(path: &Path, body: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn exclusions_and_overlay_replacement() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        let dir = root.join("data/minecraft/loot_table");
        let pool = |item: &str| format!(r#"{{"pools": [{{"items": [{{"item": "{}"}}]}}]}}"#, item);
        touch(&dir.join("empty.json"), "{}");
        touch(&dir.join("blocks/stone.json"), &pool("stone"));
        touch(&dir.join("chests/igloo.json"), &pool("apple"));
        touch(&dir.join("gameplay/fishing.json"), r#"{"pools": []}"#);
        touch(
            &root.join(DATAPACKS_DIR).join("bundle/data/minecraft/loot_table/chests/igloo.json"),
            &pool("bundle"),
        );

        let layout = DataLayout::open(root).unwrap();
        let mut writer = IndexWriter::new(root);
        let written =
            index_loot_tables(&layout, &["blocks".to_string()], &mut writer).unwrap();
        assert_eq!(written, 1);
        assert_eq!(
            fs::read_to_string(root.join("lists/loot_tables/chests/igloo.txt")).unwrap(),
            "minecraft:bundle\n"
        );
        assert!(!root.join("lists/loot_tables/blocks").exists());
        assert!(!root.join("lists/loot_tables/gameplay/fishing.txt").exists());
        assert!(!root.join("lists/loot_tables/empty.txt").exists());
    }
}
