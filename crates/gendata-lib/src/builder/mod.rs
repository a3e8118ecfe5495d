pub mod cache;
pub mod config;
pub mod core;
pub mod datagen;
pub mod error;
pub mod extractor;
pub mod manifest;
pub mod transaction;
pub mod types;

use anyhow::{Context, Result};
use config::{ASSET_INDEX_FILE, SCRATCH_LEFTOVERS};
use std::path::PathBuf;
use std::sync::Arc;
use transaction::OutputTransaction;
use types::{BuildContext, BuildSpec, ProgressReporter, Stage};

/// Main entry point: build the generated data tree of one version and move
/// it to its output directory. Returns that directory.
pub async fn build_generated_data(
    spec: BuildSpec,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<PathBuf> {
    log::info!(
        "Starting build: version={} (override={:?}, zip={}, overwrite={})",
        spec.version,
        spec.manifest_override,
        spec.zip,
        spec.overwrite
    );

    let result = run_pipeline(&spec, reporter.as_ref()).await;
    match &result {
        Ok(output) => {
            reporter.done(true, Some("Build complete"));
            log::info!("Generated data ready in {:?}", output);
        }
        Err(err) => {
            log::error!("Build failed: {:#}", err);
            reporter.done(false, Some("Build failed"));
        }
    }
    result
}

async fn run_pipeline(spec: &BuildSpec, reporter: &dyn ProgressReporter) -> Result<PathBuf> {
    let client = crate::builder::core::downloader::build_client()?;

    reporter.start_step("Resolving version manifest", None);
    let record = manifest::resolve_version(&client, spec, reporter).await?;
    let stages = Stage::plan(spec, &record);
    let mut ctx = BuildContext::new(spec, record);
    log::info!(
        "Building {} ({}) into {:?}",
        ctx.record.id(),
        ctx.record.release_type(),
        ctx.output
    );

    let txn = OutputTransaction::new(ctx.record.id(), &ctx.generated, &ctx.output, spec.overwrite);
    txn.check()?;

    std::fs::create_dir_all(&ctx.generated)
        .with_context(|| format!("Create working tree {:?}", ctx.generated))?;

    let total = stages.len() as u32;
    for (i, stage) in stages.iter().enumerate() {
        reporter.start_step(stage.label(), Some(total));
        reporter.set_percent(((i as u32 * 100) / total) as i32);
        log::debug!("[{}/{}] {}", i + 1, total, stage.label());
        run_stage(*stage, spec, &mut ctx, &client, &txn, reporter).await?;
    }

    reporter.set_percent(100);
    Ok(ctx.output)
}

async fn run_stage(
    stage: Stage,
    spec: &BuildSpec,
    ctx: &mut BuildContext,
    client: &reqwest::Client,
    txn: &OutputTransaction,
    reporter: &dyn ProgressReporter,
) -> Result<()> {
    match stage {
        Stage::DownloadClient => {
            let artifact = ctx.record.client_artifact(&ctx.scratch);
            cache::ensure(client, &artifact, reporter).await?;
        }
        Stage::DownloadAssetIndex => {
            let artifact = ctx.record.asset_index_artifact(&ctx.scratch);
            cache::ensure(client, &artifact, reporter).await?;
            let index = cache::AssetIndex::load(&artifact.local_path, &ctx.record, &spec.resources_url)?;
            log::info!("Asset index {} with {} objects", ctx.record.descriptor().assets, index.len());
            ctx.asset_index = Some(index);
        }
        Stage::DownloadServer => {
            if let Some(artifact) = ctx.record.server_artifact(&ctx.scratch) {
                cache::ensure(client, &artifact, reporter).await?;
            }
        }
        Stage::RunDataGenerator => {
            let java = datagen::locate_java(spec.java_path.as_deref())?;
            datagen::run_data_generator(&ctx.scratch, &java).await?;
        }
        Stage::ExtractClient => {
            let archive = ctx.scratch_file(config::CLIENT_JAR);
            let report = extractor::extract_client(&archive, &ctx.generated)?;
            log::info!(
                "Extracted {} client entries (legacy layout: {})",
                report.extracted,
                report.used_legacy_layout
            );
            let index = ctx
                .asset_index
                .as_ref()
                .context("Asset index not loaded before extraction")?;
            extractor::fetch_auxiliary_assets(client, index, &ctx.generated, reporter).await?;
        }
        Stage::WriteDescriptors => {
            let descriptor = ctx.generated.join(format!("{}.json", ctx.record.id()));
            write_pretty_json(&descriptor, ctx.record.descriptor())?;
            if let Some(index) = &ctx.asset_index {
                write_pretty_json(&ctx.generated.join(ASSET_INDEX_FILE), &index.to_json()?)?;
            }
        }
        Stage::IndexData => {
            remove_leftovers(ctx)?;
            crate::indexer::index_generated_data(&ctx.generated, &spec.index)?;
        }
        Stage::Bundle => {
            txn.bundle(&ctx.scratch)?;
        }
        Stage::Promote => {
            txn.commit()?;
        }
    }
    Ok(())
}

fn write_pretty_json<T: serde::Serialize + ?Sized>(path: &std::path::Path, value: &T) -> Result<()> {
    let mut body = serde_json::to_string_pretty(value)?;
    body.push('\n');
    std::fs::write(path, body).with_context(|| format!("Write {:?}", path))
}

/// Drop what the data generator leaves behind in the scratch directory
fn remove_leftovers(ctx: &BuildContext) -> Result<()> {
    for leftover in SCRATCH_LEFTOVERS {
        let path = ctx.scratch.join(leftover);
        if path.is_dir() {
            std::fs::remove_dir_all(&path).with_context(|| format!("Remove {:?}", path))?;
        } else if path.is_file() {
            std::fs::remove_file(&path).with_context(|| format!("Remove {:?}", path))?;
        } else {
            continue;
        }
        log::debug!("Removed {:?}", path);
    }
    Ok(())
}
