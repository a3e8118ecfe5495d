use crate::builder::config::DEFAULT_NAMESPACE;
use serde::{Serialize, Serializer};
use std::fmt;

/// Normalized `namespace:path` identifier.
///
/// Construction never fails: a missing namespace becomes `minecraft`,
/// backslashes become forward slashes. Parsing an already canonical id
/// yields the same id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalId(String);

impl CanonicalId {
    pub fn parse(name: &str) -> Self {
        let (namespace, path) = match name.split_once(':') {
            Some((ns, path)) => (ns, path),
            None => (DEFAULT_NAMESPACE, name),
        };
        CanonicalId(format!("{}:{}", namespace, path.replace('\\', "/")))
    }

    /// Id of a file given its path relative to a category directory;
    /// the last extension is dropped. `village\plains.nbt` → `minecraft:village/plains`
    pub fn from_file_name(relative: &str) -> Self {
        Self::parse(&strip_extension(&flatten(relative)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn namespace(&self) -> &str {
        self.0.split_once(':').map(|(ns, _)| ns).unwrap_or_default()
    }

    pub fn path(&self) -> &str {
        self.0.split_once(':').map(|(_, p)| p).unwrap_or(&self.0)
    }

    /// `#`-prefixed tag reference form
    pub fn to_tag(&self) -> String {
        format!("#{}", self.0)
    }
}

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for CanonicalId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Path part of a name: namespace dropped, separators normalized.
/// Used for output file names (`minecraft:oak_log` → `oak_log`).
pub fn flatten(name: &str) -> String {
    let path = name.split_once(':').map(|(_, p)| p).unwrap_or(name);
    path.replace('\\', "/")
}

fn strip_extension(path: &str) -> String {
    let file_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    match path[file_start..].rfind('.') {
        Some(dot) if dot > 0 => path[..file_start + dot].to_string(),
        _ => path.to_string(),
    }
}
