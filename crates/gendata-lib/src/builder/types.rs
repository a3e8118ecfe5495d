use crate::builder::cache::AssetIndex;
use crate::builder::config::{
    GENERATED_DIR, RESOURCES_URL, SCRATCH_DIR_NAME, VANILLA_MANIFEST_URL,
};
use crate::builder::manifest::VersionRecord;
use crate::indexer::IndexOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Progress reporter trait for builder stages
/// Implementations forward updates to whatever front-end drives the build
pub trait ProgressReporter: Send + Sync {
    /// Start a new stage with optional total stage count
    fn start_step(&self, name: &str, total_steps: Option<u32>);

    /// Update bytes transferred for download progress
    fn update_bytes(&self, transferred: u64, total: Option<u64>);

    /// Set overall percentage (0-100, or -1 for indeterminate)
    fn set_percent(&self, percent: i32);

    /// Set a short status message
    fn set_message(&self, message: &str);

    /// Set a numeric step count for the current stage (e.g. "3/12").
    /// `total` may be None when unknown.
    fn set_step_count(&self, current: u32, total: Option<u32>);

    /// Mark the build as complete
    fn done(&self, success: bool, message: Option<&str>);
}

/// A progress reporter that does nothing (silent).
/// Useful for tests and headless runs.
pub struct SilentProgressReporter;

impl ProgressReporter for SilentProgressReporter {
    fn start_step(&self, _name: &str, _total_steps: Option<u32>) {}
    fn update_bytes(&self, _transferred: u64, _total: Option<u64>) {}
    fn set_percent(&self, _percent: i32) {}
    fn set_message(&self, _message: &str) {}
    fn set_step_count(&self, _current: u32, _total: Option<u32>) {}
    fn done(&self, _success: bool, _message: Option<&str>) {}
}

fn default_manifest_url() -> String {
    VANILLA_MANIFEST_URL.to_string()
}

fn default_resources_url() -> String {
    RESOURCES_URL.to_string()
}

/// Build specification, handed over by whatever front-end collected the
/// user's choices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSpec {
    /// Version selector: an id, `release`/`r` or `snapshot`/`s`.
    /// Ignored when `manifest_override` is set.
    pub version: String,

    /// Parent directory of the output; the version id is appended.
    #[serde(default)]
    pub output_path: Option<PathBuf>,

    /// Replace an existing output directory
    #[serde(default)]
    pub overwrite: bool,

    /// Bundle the generated tree as `<version>.zip`
    #[serde(default)]
    pub zip: bool,

    /// Local version manifest (official or flattened shape)
    #[serde(default)]
    pub manifest_override: Option<PathBuf>,

    /// Scratch root; defaults to `<tmp>/MC Generated data`
    #[serde(default)]
    pub work_dir: Option<PathBuf>,

    /// Java executable for the data generator (searched on PATH otherwise)
    #[serde(default)]
    pub java_path: Option<PathBuf>,

    #[serde(default = "default_manifest_url")]
    pub manifest_url: String,

    #[serde(default = "default_resources_url")]
    pub resources_url: String,

    #[serde(default)]
    pub index: IndexOptions,
}

impl BuildSpec {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            output_path: None,
            overwrite: false,
            zip: false,
            manifest_override: None,
            work_dir: None,
            java_path: None,
            manifest_url: default_manifest_url(),
            resources_url: default_resources_url(),
            index: IndexOptions::default(),
        }
    }

    /// Get the scratch root shared by all versions
    pub fn scratch_root(&self) -> PathBuf {
        self.work_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(SCRATCH_DIR_NAME))
    }

    /// Get the per-version scratch directory (artifact cache + generator cwd)
    pub fn version_dir(&self, version_id: &str) -> PathBuf {
        self.scratch_root().join(version_id)
    }

    /// Compute the destination of the finished tree for a resolved version.
    /// Example: `out/1.20.1` with an output path, `release/1.20.1` without.
    pub fn output_dir(&self, record: &VersionRecord) -> PathBuf {
        match &self.output_path {
            Some(parent) => parent.join(record.id()),
            None => PathBuf::from(record.release_type().as_str()).join(record.id()),
        }
    }
}

/// Pipeline stages after manifest resolution, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    DownloadClient,
    DownloadAssetIndex,
    DownloadServer,
    RunDataGenerator,
    ExtractClient,
    WriteDescriptors,
    IndexData,
    Bundle,
    Promote,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::DownloadClient => "Downloading client.jar",
            Stage::DownloadAssetIndex => "Downloading assets.json",
            Stage::DownloadServer => "Downloading server.jar",
            Stage::RunDataGenerator => "Extracting data server",
            Stage::ExtractClient => "Extracting data client",
            Stage::WriteDescriptors => "Writing version descriptors",
            Stage::IndexData => "Listing elements and various",
            Stage::Bundle => "Empack into a ZIP",
            Stage::Promote => "Moving generated data to output",
        }
    }

    /// Ordered stage list for a resolved version.
    pub fn plan(spec: &BuildSpec, record: &VersionRecord) -> Vec<Stage> {
        let mut stages = vec![Stage::DownloadClient, Stage::DownloadAssetIndex];
        if record.has_data_generator() {
            stages.push(Stage::DownloadServer);
            stages.push(Stage::RunDataGenerator);
        }
        stages.extend([Stage::ExtractClient, Stage::WriteDescriptors, Stage::IndexData]);
        if spec.zip {
            stages.push(Stage::Bundle);
        }
        stages.push(Stage::Promote);
        stages
    }
}

/// State threaded through the stages. Only the asset-index stage writes
/// `asset_index`; extraction reads it afterwards.
#[derive(Debug)]
pub struct BuildContext {
    pub record: VersionRecord,
    /// Per-version scratch directory
    pub scratch: PathBuf,
    /// Working tree (`<scratch>/generated`)
    pub generated: PathBuf,
    pub output: PathBuf,
    pub asset_index: Option<AssetIndex>,
}

impl BuildContext {
    pub fn new(spec: &BuildSpec, record: VersionRecord) -> Self {
        let scratch = spec.version_dir(record.id());
        let output = spec.output_dir(&record);
        Self {
            generated: scratch.join(GENERATED_DIR),
            scratch,
            output,
            record,
            asset_index: None,
        }
    }

    pub fn scratch_file(&self, name: &str) -> PathBuf {
        self.scratch.join(name)
    }
}
