// This metadata supports v2 of mojang's version manifest
// Located at https://piston-meta.mojang.com/mc/game/version_manifest_v2.json

use crate::models::common::{FileInfo, GameReleaseType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct McVersionManifest {
    pub latest: Latest,

    pub versions: Vec<Version>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Latest {
    pub release: String,

    pub snapshot: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Version {
    pub id: String,

    #[serde(rename = "type")]
    pub release_type: GameReleaseType,

    pub url: String,

    pub time: String,

    #[serde(rename = "releaseTime")]
    pub release_time: String,

    pub sha1: String,
}

/// Per-version manifest as served by the launcher meta endpoint.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub id: String,

    #[serde(rename = "type")]
    pub release_type: GameReleaseType,

    pub time: String,

    pub release_time: String,

    pub assets: String,

    pub asset_index: AssetIndexRef,

    pub downloads: Downloads,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AssetIndexRef {
    pub id: String,
    pub url: String,
    pub sha1: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Downloads {
    pub client: FileInfo,
    #[serde(default)]
    pub client_mappings: Option<FileInfo>,
    #[serde(default)]
    pub server: Option<FileInfo>,
    #[serde(default)]
    pub server_mappings: Option<FileInfo>,
}

/// Asset index file (`indexes/<id>.json`). Keys other than `objects`
/// (`virtual`, `map_to_resources`) are carried through untouched.
#[derive(Serialize, Deserialize, Debug)]
pub struct AssetIndexFile {
    pub objects: BTreeMap<String, AssetObject>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AssetObject {
    pub hash: String,
    pub size: u64,
}
