use crate::models::common::GameReleaseType;
use serde::{Deserialize, Serialize};

/// Flattened version descriptor written next to the generated data.
///
/// The same shape is accepted back as a manifest override, in which case
/// the artifact hashes are unknown and every artifact is re-fetched.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct VersionDescriptor {
    pub id: String,

    #[serde(rename = "type")]
    pub release_type: GameReleaseType,

    pub time: String,

    #[serde(rename = "releaseTime")]
    pub release_time: String,

    #[serde(default)]
    pub url: Option<String>,

    pub assets: String,

    pub asset_index: String,

    pub client: String,

    #[serde(default)]
    pub client_mappings: Option<String>,

    #[serde(default)]
    pub server: Option<String>,

    #[serde(default)]
    pub server_mappings: Option<String>,
}
