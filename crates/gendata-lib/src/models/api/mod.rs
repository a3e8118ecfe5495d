pub mod version_meta;
