//! Id listings: structures, flat data categories, worldgen and registries.

use crate::builder::config::{
    LEGACY_BIOMES_DIR, REGISTRIES_REPORT, STRUCTURE_DIRS, TAGS_DIR, WORLDGEN_DIRS,
};
use crate::builder::error::BuildError;
use crate::indexer::ids::{flatten, CanonicalId};
use crate::indexer::layout::{ids_under, subdirectories, DataLayout};
use crate::indexer::read_report;
use crate::indexer::writer::{IndexWriter, Listings};
use anyhow::Result;

pub const STRUCTURES_TARGET: &str = "structures.nbt.txt";
pub const REGISTRIES_TARGET: &str = "registries.txt";

/// `*.nbt` structure names across primary and overlays
pub fn index_structures(layout: &DataLayout, writer: &mut IndexWriter) -> Result<usize> {
    let dir = layout
        .resolve_first(STRUCTURE_DIRS)
        .unwrap_or(STRUCTURE_DIRS[0]);
    let ids = layout.collect_ids(dir, "nbt")?;
    let lines: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    writer.write_lines(STRUCTURES_TARGET, &lines)?;
    log::debug!("{} structures from {}", lines.len(), dir);
    Ok(lines.len())
}

/// Data categories listed like registries without appearing in the
/// registries report
pub fn index_flat_categories(
    layout: &DataLayout,
    categories: &[String],
    listings: &mut Listings,
) -> Result<()> {
    for category in categories {
        let target = format!("{}.txt", category);
        listings.add_entries(
            &target,
            layout.collect_ids(&format!("data/minecraft/{}", category), "json")?,
        );
        listings.add_tags(
            &target,
            layout.collect_ids(&format!("{}/{}", TAGS_DIR, category), "json")?,
        );
    }
    Ok(())
}

pub fn index_worldgen(layout: &DataLayout, listings: &mut Listings) -> Result<()> {
    if let Some(dir) = layout.resolve_first(WORLDGEN_DIRS) {
        let subdirs = subdirectories(&layout.root().join(dir))?;
        log::debug!("worldgen root {} with {} categories", dir, subdirs.len());
        for sub in subdirs {
            let target = format!("worldgen/{}.txt", sub);
            listings.add_entries(&target, layout.collect_ids(&format!("{}/{}", dir, sub), "json")?);
            listings.add_tags(
                &target,
                layout.collect_ids(&format!("{}/worldgen/{}", TAGS_DIR, sub), "json")?,
            );
        }
    }

    let legacy = layout.root().join(LEGACY_BIOMES_DIR);
    if legacy.is_dir() {
        log::debug!("legacy biome report found");
        listings.add_entries("worldgen/biome.txt", ids_under(&legacy, "json")?);
    }
    Ok(())
}

/// Sorted registry ids, then per registry its declared entries plus the
/// tags found in the tree.
pub fn index_registries(
    layout: &DataLayout,
    writer: &mut IndexWriter,
    listings: &mut Listings,
) -> Result<usize> {
    let Some(report) = read_report(layout.root(), REGISTRIES_REPORT)? else {
        return Ok(0);
    };
    let Some(registries) = report.as_object() else {
        return Err(BuildError::structural("registries", REGISTRIES_REPORT, "not an object").into());
    };

    let mut ids: Vec<CanonicalId> = registries.keys().map(|k| CanonicalId::parse(k)).collect();
    ids.sort();
    let lines: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    writer.write_lines(REGISTRIES_TARGET, &lines)?;

    for (key, registry) in registries {
        let name = flatten(key);
        let entries = registry
            .get("entries")
            .and_then(|e| e.as_object())
            .ok_or_else(|| BuildError::structural("registry", key.as_str(), "missing entries"))?;

        let target = format!("{}.txt", name);
        listings.add_entries(&target, entries.keys().map(|k| CanonicalId::parse(k)));

        let mut tag_dir = format!("{}/{}", TAGS_DIR, name);
        if !layout.root().join(&tag_dir).is_dir() {
            tag_dir.push('s');
        }
        listings.add_tags(&target, layout.collect_ids(&tag_dir, "json")?);
    }

    Ok(registries.len())
}
