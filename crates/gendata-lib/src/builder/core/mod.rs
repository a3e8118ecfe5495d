pub mod downloader;
pub mod process;
