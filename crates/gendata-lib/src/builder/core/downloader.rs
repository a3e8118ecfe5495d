use crate::builder::types::ProgressReporter;
use anyhow::{Context, Result};
use futures::StreamExt;
use reqwest::Client;
use sha1::{Digest, Sha1};
use std::path::Path;
use std::time::Instant;
use tokio::fs::{create_dir_all, File};
use tokio::io::AsyncWriteExt;

/// Shared HTTP client for one build run
pub fn build_client() -> Result<Client> {
    let client = Client::builder()
        .user_agent(concat!("gendata-lib/", env!("CARGO_PKG_VERSION")))
        .tcp_keepalive(Some(std::time::Duration::from_secs(30)))
        .build()?;
    Ok(client)
}

/// Download a file to a path with progress reporting.
///
/// The body is streamed to `<name>.part` and renamed into place, so an
/// interrupted download never leaves a truncated file at `path`. When
/// `expected_sha1` is given the streamed hash is compared and a mismatch is
/// logged; the caller decides what a mismatch means.
pub async fn download_to_path(
    client: &Client,
    url: &str,
    path: &Path,
    expected_sha1: Option<&str>,
    reporter: &dyn ProgressReporter,
) -> Result<()> {
    log::debug!("Downloading: {} -> {:?}", url, path);

    if let Some(parent) = path.parent() {
        create_dir_all(parent)
            .await
            .with_context(|| format!("Create download dir {:?}", parent))?;
    }

    let start = Instant::now();
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        anyhow::bail!("HTTP error {}: {}", response.status(), url);
    }

    let total_size = response.content_length();
    log::debug!("Download size: {:?} bytes", total_size);

    let tmp_name = format!(
        "{}.part",
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("download")
    );
    let tmp_path = path.with_file_name(tmp_name);
    let (downloaded, hasher) =
        stream_to_part_file(response.bytes_stream(), &tmp_path, total_size, reporter)
            .await
            .with_context(|| format!("Download {}", url))?;

    if let Some(expected) = expected_sha1 {
        let computed = format!("{:x}", hasher.finalize());
        if !computed.eq_ignore_ascii_case(expected) {
            log::warn!(
                "SHA1 mismatch for {}: expected {}, got {}",
                url,
                expected,
                computed
            );
        } else {
            log::debug!("SHA1 validated: {}", computed);
        }
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Move {:?} -> {:?}", tmp_path, path))?;

    let secs = start.elapsed().as_secs_f64();
    log::info!(
        "Download stats: url={}, size={} bytes, time={:.2}s, throughput={:.2} MB/s",
        url,
        downloaded,
        secs,
        (downloaded as f64 / 1024.0 / 1024.0) / secs.max(0.001)
    );

    Ok(())
}

/// Write `stream` to `tmp_path`, hashing as it goes. On any error the
/// partial file is removed before the error is returned.
async fn stream_to_part_file<S, B, E>(
    stream: S,
    tmp_path: &Path,
    total_size: Option<u64>,
    reporter: &dyn ProgressReporter,
) -> Result<(u64, Sha1)>
where
    S: futures::Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::error::Error + Send + Sync + 'static,
{
    let mut stream = std::pin::pin!(stream);
    let written = async {
        let mut file = File::create(tmp_path)
            .await
            .with_context(|| format!("Create {:?}", tmp_path))?;
        let mut downloaded: u64 = 0;
        let mut hasher = Sha1::new();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result?;
            let chunk = chunk.as_ref();
            file.write_all(chunk).await?;
            hasher.update(chunk);

            downloaded += chunk.len() as u64;
            reporter.update_bytes(downloaded, total_size);
        }
        file.flush().await?;
        file.sync_all().await?;
        Ok::<_, anyhow::Error>((downloaded, hasher))
    }
    .await;

    if written.is_err() {
        if let Err(e) = tokio::fs::remove_file(tmp_path).await {
            log::debug!("Could not remove partial download {:?}: {}", tmp_path, e);
        }
    }
    written
}

/// Download JSON using an existing Client and deserialize
pub async fn download_json_with_client<T: serde::de::DeserializeOwned>(
    client: &Client,
    url: &str,
) -> Result<T> {
    log::debug!("Downloading JSON: {}", url);
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        anyhow::bail!("HTTP error {}: {}", response.status(), url);
    }

    let data = response.json().await?;
    Ok(data)
}
