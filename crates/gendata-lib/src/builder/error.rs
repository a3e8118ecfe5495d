use std::path::PathBuf;

/// Failures the pipeline reports by kind. They travel inside `anyhow::Error`;
/// callers recover the kind with `err.downcast_ref::<BuildError>()`.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Invalid manifest {origin}: {reason}")]
    ManifestInvalid { origin: String, reason: String },

    #[error("Failed to fetch {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("The output \"{}\" already exists and overwrite is not enabled", .path.display())]
    OutputConflict { path: PathBuf },

    #[error("Unknown entry type '{kind}' in loot table '{table}'")]
    UnknownEntryKind { table: String, kind: String },

    #[error("Invalid {category} '{name}': {detail}")]
    StructuralError {
        category: String,
        name: String,
        detail: String,
    },

    #[error("Data generator failed: {0}")]
    DataGenerator(String),
}

impl BuildError {
    pub fn structural(
        category: impl Into<String>,
        name: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        BuildError::StructuralError {
            category: category.into(),
            name: name.into(),
            detail: detail.into(),
        }
    }

    pub fn fetch(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        BuildError::FetchFailed {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
