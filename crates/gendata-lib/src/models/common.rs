use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Debug)]
pub enum GameReleaseType {
    #[serde(rename = "old_alpha")]
    OldAlpha,

    #[serde(rename = "old_beta")]
    OldBeta,

    #[serde(rename = "release")]
    Release,

    #[serde(rename = "snapshot")]
    Snapshot,
}

impl GameReleaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameReleaseType::OldAlpha => "old_alpha",
            GameReleaseType::OldBeta => "old_beta",
            GameReleaseType::Release => "release",
            GameReleaseType::Snapshot => "snapshot",
        }
    }
}

impl fmt::Display for GameReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FileInfo {
    pub url: String,
    pub sha1: String,
}
