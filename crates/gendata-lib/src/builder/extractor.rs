//! Client archive extraction and auxiliary asset retrieval.

use crate::builder::cache::{ensure, AssetIndex};
use crate::builder::config::{
    AUXILIARY_ASSETS, DATAPACKS_DIR, LEGACY_ASSET_EXTENSIONS, TEXTURE_ASSET_PREFIX,
};
use crate::builder::types::ProgressReporter;
use anyhow::{Context, Result};
use reqwest::Client;
use std::fs;
use std::path::{Path, PathBuf};

/// What an extraction pass did
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractionReport {
    pub extracted: usize,
    pub used_legacy_layout: bool,
}

/// Extract `assets/` and `data/` out of the client archive into `dest`.
///
/// Archives that carry no `assets/` root (pre-1.6 layout) get a second pass
/// that relocates loose textures, texts and language files under `assets/`.
pub fn extract_client(archive_path: &Path, dest: &Path) -> Result<ExtractionReport> {
    log::debug!("Extracting {:?} to {:?}", archive_path, dest);

    let file = fs::File::open(archive_path)
        .with_context(|| format!("Open client archive {:?}", archive_path))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("Read client archive {:?}", archive_path))?;

    fs::create_dir_all(dest).with_context(|| format!("Create {:?}", dest))?;

    let mut report = ExtractionReport::default();
    report.extracted += extract_matching(&mut archive, dest, |name| {
        name.starts_with("assets/") || name.starts_with("data/")
    })?;

    if !dest.join("assets").exists() {
        log::info!("No assets/ root in {:?}, using legacy layout", archive_path);
        report.used_legacy_layout = true;
        report.extracted += extract_matching(&mut archive, &dest.join("assets"), |name| {
            LEGACY_ASSET_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
        })?;
    }

    log::debug!("Client extraction complete: {} entries", report.extracted);
    Ok(report)
}

fn extract_matching<R, F>(
    archive: &mut zip::ZipArchive<R>,
    dest: &Path,
    filter: F,
) -> Result<usize>
where
    R: std::io::Read + std::io::Seek,
    F: Fn(&str) -> bool,
{
    let mut count = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if !filter(entry.name()) {
            continue;
        }

        let Some(relative) = entry.enclosed_name() else {
            log::warn!("Skipping archive entry outside destination: {}", entry.name());
            continue;
        };
        let outpath = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&outpath).with_context(|| format!("Create {:?}", outpath))?;
            continue;
        }

        if outpath.is_file() {
            fs::remove_file(&outpath)
                .with_context(|| format!("Remove existing {:?}", outpath))?;
        }
        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent).with_context(|| format!("Create {:?}", parent))?;
        }
        let mut outfile =
            fs::File::create(&outpath).with_context(|| format!("Create {:?}", outpath))?;
        std::io::copy(&mut entry, &mut outfile)
            .with_context(|| format!("Extract {:?}", outpath))?;
        count += 1;
    }
    Ok(count)
}

/// Logical asset names fetched individually from the asset index
pub fn auxiliary_asset_names(index: &AssetIndex) -> Vec<String> {
    let mut names: Vec<String> = AUXILIARY_ASSETS
        .iter()
        .filter(|name| index.get(name).is_some())
        .map(|name| name.to_string())
        .collect();
    names.extend(
        index
            .names()
            .filter(|name| name.starts_with(TEXTURE_ASSET_PREFIX))
            .map(str::to_string),
    );
    names
}

/// Fetch the auxiliary assets through the cache into `<dest>/assets/`
pub async fn fetch_auxiliary_assets(
    client: &Client,
    index: &AssetIndex,
    dest: &Path,
    reporter: &dyn ProgressReporter,
) -> Result<usize> {
    let assets_root = dest.join("assets");
    let names = auxiliary_asset_names(index);
    let total = names.len() as u32;

    for (i, name) in names.iter().enumerate() {
        reporter.set_step_count(i as u32 + 1, Some(total));
        if let Some(artifact) = index.artifact(name, &assets_root) {
            ensure(client, &artifact, reporter).await?;
        }
    }

    log::info!("Auxiliary assets ready: {}", names.len());
    Ok(names.len())
}

/// Datapack overlay roots under `data/minecraft/datapacks/`, sorted by name
pub fn datapack_overlays(root: &Path) -> Result<Vec<PathBuf>> {
    let dir = root.join(DATAPACKS_DIR);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut overlays = Vec::new();
    for entry in fs::read_dir(&dir).with_context(|| format!("Read dir {:?}", dir))? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            overlays.push(entry.path());
        }
    }
    overlays.sort();
    Ok(overlays)
}
