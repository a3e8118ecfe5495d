pub mod builder;
pub mod indexer;
pub mod models;

pub use builder::build_generated_data;
pub use builder::error::BuildError;
pub use builder::types::{BuildSpec, ProgressReporter, SilentProgressReporter};
pub use indexer::{index_generated_data, IndexOptions};
