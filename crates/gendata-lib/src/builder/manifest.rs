//! Version manifest resolution.
//!
//! Turns a version selector (or a local manifest file) into one
//! [`VersionRecord`]. Two manifest shapes are accepted: the official
//! per-version manifest and the flattened descriptor a previous build wrote.

use crate::builder::cache::{ensure, ArtifactDescriptor};
use crate::builder::config::{ASSET_INDEX_FILE, CLIENT_JAR, DATA_GENERATOR_SINCE_YEAR, SERVER_JAR};
use crate::builder::core::downloader::download_json_with_client;
use crate::builder::error::BuildError;
use crate::builder::types::{BuildSpec, ProgressReporter};
use crate::models::api::version_meta::generated::VersionDescriptor;
use crate::models::api::version_meta::vanilla::{McVersionManifest, Version, VersionInfo};
use crate::models::common::GameReleaseType;
use anyhow::Result;
use chrono::{DateTime, Datelike};
use reqwest::Client;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSelector {
    LatestRelease,
    LatestSnapshot,
    Id(String),
}

impl FromStr for VersionSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "r" | "release" => VersionSelector::LatestRelease,
            "s" | "snapshot" => VersionSelector::LatestSnapshot,
            id => VersionSelector::Id(id.to_string()),
        })
    }
}

impl VersionSelector {
    /// Pick the matching entry of the launcher version list
    pub fn pick<'a>(&self, manifest: &'a McVersionManifest) -> Option<&'a Version> {
        let id = match self {
            VersionSelector::LatestRelease => manifest.latest.release.as_str(),
            VersionSelector::LatestSnapshot => manifest.latest.snapshot.as_str(),
            VersionSelector::Id(id) => id.as_str(),
        };
        manifest.versions.iter().find(|v| v.id == id)
    }
}

/// Resolved version: the descriptor plus the artifact hashes known for it.
#[derive(Debug, Clone)]
pub struct VersionRecord {
    descriptor: VersionDescriptor,
    asset_index_sha1: Option<String>,
    client_sha1: Option<String>,
    server_sha1: Option<String>,
}

impl VersionRecord {
    /// Record without any known hashes (flattened manifest shape)
    pub fn from_descriptor(descriptor: VersionDescriptor) -> Self {
        Self {
            descriptor,
            asset_index_sha1: None,
            client_sha1: None,
            server_sha1: None,
        }
    }

    fn from_official(info: VersionInfo, url: Option<String>) -> Self {
        let downloads = info.downloads;
        Self {
            descriptor: VersionDescriptor {
                id: info.id,
                release_type: info.release_type,
                time: info.time,
                release_time: info.release_time,
                url,
                assets: info.assets,
                asset_index: info.asset_index.url,
                client: downloads.client.url,
                client_mappings: downloads.client_mappings.map(|f| f.url),
                server: downloads.server.as_ref().map(|f| f.url.clone()),
                server_mappings: downloads.server_mappings.map(|f| f.url),
            },
            asset_index_sha1: Some(info.asset_index.sha1),
            client_sha1: Some(downloads.client.sha1),
            server_sha1: downloads.server.map(|f| f.sha1),
        }
    }

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn release_type(&self) -> GameReleaseType {
        self.descriptor.release_type
    }

    pub fn descriptor(&self) -> &VersionDescriptor {
        &self.descriptor
    }

    pub fn release_year(&self) -> Option<i32> {
        DateTime::parse_from_rfc3339(&self.descriptor.release_time)
            .ok()
            .map(|dt| dt.year())
    }

    /// Whether the server jar of this release ships the data generator
    pub fn has_data_generator(&self) -> bool {
        self.descriptor.server.is_some()
            && self
                .release_year()
                .is_some_and(|year| year >= DATA_GENERATOR_SINCE_YEAR)
    }

    pub fn client_artifact(&self, scratch: &Path) -> ArtifactDescriptor {
        ArtifactDescriptor::new(
            &self.descriptor.client,
            self.client_sha1.as_deref(),
            scratch.join(CLIENT_JAR),
        )
    }

    pub fn server_artifact(&self, scratch: &Path) -> Option<ArtifactDescriptor> {
        self.descriptor.server.as_ref().map(|url| {
            ArtifactDescriptor::new(url, self.server_sha1.as_deref(), scratch.join(SERVER_JAR))
        })
    }

    pub fn asset_index_artifact(&self, scratch: &Path) -> ArtifactDescriptor {
        ArtifactDescriptor::new(
            &self.descriptor.asset_index,
            self.asset_index_sha1.as_deref(),
            scratch.join(ASSET_INDEX_FILE),
        )
    }
}

/// The two accepted manifest generations, decided once at parse time.
#[derive(Debug, Clone)]
pub enum ManifestShape {
    Official(VersionInfo),
    Flattened(VersionDescriptor),
}

impl ManifestShape {
    pub fn parse(origin: &str, bytes: &[u8]) -> Result<Self, BuildError> {
        let invalid = |reason: String| BuildError::ManifestInvalid {
            origin: origin.to_string(),
            reason,
        };

        let value: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| invalid(e.to_string()))?;
        if !value.is_object() {
            return Err(invalid("manifest is not a JSON object".to_string()));
        }

        if value.get("assetIndex").is_some() {
            serde_json::from_value(value)
                .map(ManifestShape::Official)
                .map_err(|e| invalid(e.to_string()))
        } else {
            serde_json::from_value(value)
                .map(ManifestShape::Flattened)
                .map_err(|e| invalid(e.to_string()))
        }
    }

    /// `url` is where an official manifest came from; the flattened shape
    /// already carries its own.
    pub fn into_record(self, url: Option<String>) -> VersionRecord {
        match self {
            ManifestShape::Official(info) => VersionRecord::from_official(info, url),
            ManifestShape::Flattened(descriptor) => VersionRecord::from_descriptor(descriptor),
        }
    }
}

/// Resolve the version record for a build
pub async fn resolve_version(
    client: &Client,
    spec: &BuildSpec,
    reporter: &dyn ProgressReporter,
) -> Result<VersionRecord> {
    if let Some(path) = &spec.manifest_override {
        log::info!("Reading local manifest {:?}", path);
        let origin = path.display().to_string();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| BuildError::fetch(origin.clone(), e))?;
        let record = ManifestShape::parse(&origin, &bytes)?.into_record(None);
        log::info!("Local manifest resolved to {}", record.id());
        return Ok(record);
    }

    log::info!("Downloading version manifest from {}", spec.manifest_url);
    let manifest: McVersionManifest = download_json_with_client(client, &spec.manifest_url)
        .await
        .map_err(|e| BuildError::fetch(spec.manifest_url.clone(), format!("{:#}", e)))?;

    let selector: VersionSelector = spec.version.parse().unwrap_or_else(|e| match e {});
    let entry = selector.pick(&manifest).ok_or_else(|| {
        BuildError::fetch(
            spec.manifest_url.clone(),
            format!("version {} not found", spec.version),
        )
    })?;
    log::debug!("Found version entry: {}", entry.id);

    let local = ArtifactDescriptor::new(
        &entry.url,
        Some(&entry.sha1),
        spec.version_dir(&entry.id).join(format!("{}.json", entry.id)),
    );
    ensure(client, &local, reporter).await?;

    let bytes = tokio::fs::read(&local.local_path)
        .await
        .map_err(|e| BuildError::fetch(entry.url.clone(), e))?;
    let record = ManifestShape::parse(&entry.url, &bytes)?.into_record(Some(entry.url.clone()));
    Ok(record)
}
