//! Derived listings over an extracted data tree.
//!
//! Everything lands under `lists/` next to the inputs. Categories whose
//! source report is missing are skipped with a warning; malformed input
//! fails the whole pass.

pub mod blocks;
pub mod commands;
pub mod ids;
pub mod languages;
pub mod layout;
pub mod listings;
pub mod loot;
pub mod sounds;
pub mod writer;

use crate::builder::config::{EXCLUDED_LOOT_PREFIXES, FLAT_CATEGORIES};
use anyhow::{Context, Result};
use layout::DataLayout;
use serde::{Deserialize, Serialize};
use std::path::Path;
use writer::{IndexWriter, Listings};

pub use ids::CanonicalId;

/// Tunables of the indexer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IndexOptions {
    /// Loot tables whose name starts with one of these are not listed
    pub excluded_loot_prefixes: Vec<String>,
    /// Data categories under `data/minecraft/` listed like registries
    pub flat_categories: Vec<String>,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            excluded_loot_prefixes: EXCLUDED_LOOT_PREFIXES.iter().map(|s| s.to_string()).collect(),
            flat_categories: FLAT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexReport {
    pub structures: usize,
    pub loot_tables: usize,
    pub blocks: usize,
    pub commands: usize,
    pub registries: usize,
    pub sound_events: usize,
    pub languages: usize,
    pub files_written: usize,
}

/// Read a JSON report relative to `root`. A missing file is `None` and logged.
pub(crate) fn read_report(root: &Path, relative: &str) -> Result<Option<serde_json::Value>> {
    let path = root.join(relative);
    if !path.is_file() {
        log::warn!("{} not found, skipping", relative);
        return Ok(None);
    }
    let data = std::fs::read(&path).with_context(|| format!("Read {:?}", path))?;
    let value = serde_json::from_slice(&data).with_context(|| format!("Parse {:?}", path))?;
    Ok(Some(value))
}

/// Run every listing over the tree at `root`
pub fn index_generated_data(root: &Path, options: &IndexOptions) -> Result<IndexReport> {
    log::info!("Indexing generated data in {:?}", root);
    let layout = DataLayout::open(root)?;
    let mut writer = IndexWriter::new(root);
    let mut merged = Listings::default();
    let mut report = IndexReport::default();

    report.structures = listings::index_structures(&layout, &mut writer)?;
    listings::index_flat_categories(&layout, &options.flat_categories, &mut merged)?;
    report.loot_tables =
        loot::index_loot_tables(&layout, &options.excluded_loot_prefixes, &mut writer)?;
    listings::index_worldgen(&layout, &mut merged)?;
    report.blocks = blocks::index_blocks(root, &mut writer)?.blocks;
    report.commands = commands::index_commands(root, &mut writer, &mut merged)?;
    report.registries = listings::index_registries(&layout, &mut writer, &mut merged)?;
    report.sound_events = sounds::index_sounds(root, &mut writer)?;
    report.languages = languages::index_languages(root, &mut writer)?;

    merged.flush(&mut writer)?;
    report.files_written = writer.written();

    log::info!(
        "Indexed {} blocks, {} commands, {} registries, {} loot tables ({} files)",
        report.blocks,
        report.commands,
        report.registries,
        report.loot_tables,
        report.files_written
    );
    Ok(report)
}
