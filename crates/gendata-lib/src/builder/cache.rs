use crate::builder::core::downloader::download_to_path;
use crate::builder::error::BuildError;
use crate::builder::manifest::VersionRecord;
use crate::builder::types::ProgressReporter;
use crate::models::api::version_meta::vanilla::AssetIndexFile;
use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// One downloadable artifact and where it is cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    pub url: String,
    pub expected_hash: Option<String>,
    pub local_path: PathBuf,
}

impl ArtifactDescriptor {
    pub fn new(url: &str, expected_hash: Option<&str>, local_path: PathBuf) -> Self {
        Self {
            url: url.to_string(),
            expected_hash: expected_hash.map(str::to_string),
            local_path,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Fetched,
}

/// Make sure `artifact.local_path` holds the artifact.
///
/// A present file whose SHA-1 equals the expected hash is used as is,
/// without touching the network. Anything else is removed and downloaded
/// again; a download failure is a `FetchFailed`.
pub async fn ensure(
    client: &Client,
    artifact: &ArtifactDescriptor,
    reporter: &dyn ProgressReporter,
) -> Result<CacheOutcome> {
    let path = &artifact.local_path;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let (check_path, expected) = (path.clone(), artifact.expected_hash.clone());
    let hit =
        tokio::task::spawn_blocking(move || hash_matches(&check_path, expected.as_deref()))
            .await??;
    if hit {
        log::debug!("File exists and hash matches, skipping: {:?}", path);
        reporter.set_message(&format!("Using cached {}", name));
        return Ok(CacheOutcome::Hit);
    }

    reporter.set_message(&format!("Downloading {}", name));
    if path.exists() {
        log::info!("Stale cached artifact, re-downloading: {:?}", path);
        fs::remove_file(path).with_context(|| format!("Remove stale artifact {:?}", path))?;
    }

    download_to_path(
        client,
        &artifact.url,
        path,
        artifact.expected_hash.as_deref(),
        reporter,
    )
    .await
    .map_err(|e| BuildError::fetch(artifact.url.clone(), format!("{:#}", e)))?;

    Ok(CacheOutcome::Fetched)
}

/// True when `path` exists and hashes to `expected`. No expected hash means
/// the file can't be trusted.
pub fn hash_matches(path: &Path, expected: Option<&str>) -> Result<bool> {
    let Some(expected) = expected else {
        return Ok(false);
    };
    if !path.is_file() {
        return Ok(false);
    }
    Ok(sha1_file(path)?.eq_ignore_ascii_case(expected))
}

pub fn sha1_file(path: &Path) -> Result<String> {
    let file =
        fs::File::open(path).with_context(|| format!("Open file for hashing: {:?}", path))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha1::new();
    let mut buffer = [0u8; 8192];

    loop {
        let read = reader
            .read(&mut buffer)
            .with_context(|| format!("Read bytes while hashing: {:?}", path))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexedAsset {
    pub hash: String,
    pub size: u64,
    pub url: String,
}

/// Asset index of the version with a download url per object, sorted by
/// logical asset path.
#[derive(Debug, Clone)]
pub struct AssetIndex {
    assets: String,
    asset_index: String,
    extra: serde_json::Map<String, serde_json::Value>,
    objects: BTreeMap<String, IndexedAsset>,
}

impl AssetIndex {
    pub fn load(path: &Path, record: &VersionRecord, resources_url: &str) -> Result<Self> {
        let data = fs::read(path).with_context(|| format!("Read asset index {:?}", path))?;
        let file: AssetIndexFile = serde_json::from_slice(&data)
            .with_context(|| format!("Parse asset index {:?}", path))?;
        Ok(Self::from_file(file, record, resources_url))
    }

    pub fn from_file(file: AssetIndexFile, record: &VersionRecord, resources_url: &str) -> Self {
        let base = resources_url.trim_end_matches('/');
        let objects = file
            .objects
            .into_iter()
            .map(|(name, obj)| {
                let prefix = obj.hash.get(0..2).unwrap_or_default();
                let url = format!("{}/{}/{}", base, prefix, obj.hash);
                (
                    name,
                    IndexedAsset {
                        hash: obj.hash,
                        size: obj.size,
                        url,
                    },
                )
            })
            .collect();

        Self {
            assets: record.descriptor().assets.clone(),
            asset_index: record.descriptor().asset_index.clone(),
            extra: file.extra,
            objects,
        }
    }

    pub fn get(&self, name: &str) -> Option<&IndexedAsset> {
        self.objects.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Cache descriptor for one logical asset, stored at `<assets_root>/<name>`
    pub fn artifact(&self, name: &str, assets_root: &Path) -> Option<ArtifactDescriptor> {
        self.get(name).map(|asset| {
            ArtifactDescriptor::new(&asset.url, Some(&asset.hash), assets_root.join(name))
        })
    }

    /// Canonical `assets.json`: version keys first, then the index's own
    /// keys, then the sorted objects.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let mut map = serde_json::Map::new();
        map.insert("assets".to_string(), self.assets.clone().into());
        map.insert("asset_index".to_string(), self.asset_index.clone().into());
        for (k, v) in &self.extra {
            map.insert(k.clone(), v.clone());
        }
        map.insert("objects".to_string(), serde_json::to_value(&self.objects)?);
        Ok(serde_json::Value::Object(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::types::SilentProgressReporter;
    use crate::models::api::version_meta::generated::VersionDescriptor;
    use crate::models::common::GameReleaseType;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const HELLO_SHA1: &str = "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed";

    #[test]
    fn sha1_of_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("hello");
        std::fs::write(&file, "hello world").unwrap();
        assert_eq!(sha1_file(&file).unwrap(), HELLO_SHA1);
        assert!(hash_matches(&file, Some(&HELLO_SHA1.to_uppercase())).unwrap());
        assert!(!hash_matches(&file, None).unwrap());
        assert!(!hash_matches(&tmp.path().join("absent"), Some(HELLO_SHA1)).unwrap());
    }

    #[tokio::test]
    async fn cache_hit_skips_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("other"))
            .expect(0)
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let local = tmp.path().join("client.jar");
        std::fs::write(&local, "hello world").unwrap();

        let artifact = ArtifactDescriptor::new(
            &format!("{}/client.jar", server.uri()),
            Some(HELLO_SHA1),
            local.clone(),
        );
        let client = reqwest::Client::new();
        let outcome = ensure(&client, &artifact, &SilentProgressReporter).await.unwrap();
        assert_eq!(outcome, CacheOutcome::Hit);
        assert_eq!(std::fs::read_to_string(&local).unwrap(), "hello world");
    }

    #[derive(Default)]
    struct RecordingReporter {
        messages: std::sync::Mutex<Vec<String>>,
    }

    impl ProgressReporter for RecordingReporter {
        fn start_step(&self, _name: &str, _total_steps: Option<u32>) {}
        fn update_bytes(&self, _transferred: u64, _total: Option<u64>) {}
        fn set_percent(&self, _percent: i32) {}
        fn set_message(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }
        fn set_step_count(&self, _current: u32, _total: Option<u32>) {}
        fn done(&self, _success: bool, _message: Option<&str>) {}
    }

    #[tokio::test]
    async fn reports_cache_use_and_downloads() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/server.jar"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello world"))
            .expect(1)
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let artifact = ArtifactDescriptor::new(
            &format!("{}/server.jar", server.uri()),
            Some(HELLO_SHA1),
            tmp.path().join("server.jar"),
        );
        let client = reqwest::Client::new();
        let reporter = RecordingReporter::default();
        ensure(&client, &artifact, &reporter).await.unwrap();
        ensure(&client, &artifact, &reporter).await.unwrap();

        assert_eq!(
            *reporter.messages.lock().unwrap(),
            vec!["Downloading server.jar", "Using cached server.jar"]
        );
    }

    #[tokio::test]
    async fn stale_file_is_replaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/client.jar"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello world"))
            .expect(1)
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let local = tmp.path().join("client.jar");
        std::fs::write(&local, "corrupted").unwrap();

        let artifact = ArtifactDescriptor::new(
            &format!("{}/client.jar", server.uri()),
            Some(HELLO_SHA1),
            local.clone(),
        );
        let client = reqwest::Client::new();
        let outcome = ensure(&client, &artifact, &SilentProgressReporter).await.unwrap();
        assert_eq!(outcome, CacheOutcome::Fetched);
        assert_eq!(std::fs::read_to_string(&local).unwrap(), "hello world");

        // second run is a hit
        let outcome = ensure(&client, &artifact, &SilentProgressReporter).await.unwrap();
        assert_eq!(outcome, CacheOutcome::Hit);
    }

    #[tokio::test]
    async fn failed_fetch_is_fetch_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let artifact = ArtifactDescriptor::new(
            &format!("{}/server.jar", server.uri()),
            None,
            tmp.path().join("server.jar"),
        );
        let err = ensure(&reqwest::Client::new(), &artifact, &SilentProgressReporter)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::FetchFailed { .. })
        ));
    }

    #[test]
    fn asset_index_adds_urls_and_keeps_extra_keys() {
        let record = VersionRecord::from_descriptor(VersionDescriptor {
            id: "1.5.2".to_string(),
            release_type: GameReleaseType::Release,
            time: "2013-04-25T15:45:00+00:00".to_string(),
            release_time: "2013-04-25T15:45:00+00:00".to_string(),
            url: None,
            assets: "pre-1.6".to_string(),
            asset_index: "https://example.com/pre-1.6.json".to_string(),
            client: "https://example.com/client.jar".to_string(),
            client_mappings: None,
            server: None,
            server_mappings: None,
        });
        let file: AssetIndexFile = serde_json::from_str(
            r#"{"map_to_resources": true, "objects": {
                "sounds.json": {"hash": "bbbb0000", "size": 2},
                "pack.mcmeta": {"hash": "aaaa0000", "size": 1}
            }}"#,
        )
        .unwrap();
        let index = AssetIndex::from_file(file, &record, "https://res.example.com/");

        assert_eq!(index.names().collect::<Vec<_>>(), vec!["pack.mcmeta", "sounds.json"]);
        assert_eq!(
            index.get("pack.mcmeta").unwrap().url,
            "https://res.example.com/aa/aaaa0000"
        );

        let json = index.to_json().unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["assets", "asset_index", "map_to_resources", "objects"]);

        let artifact = index.artifact("sounds.json", Path::new("/gen/assets")).unwrap();
        assert_eq!(artifact.local_path, PathBuf::from("/gen/assets/sounds.json"));
        assert!(index.artifact("missing", Path::new("/gen/assets")).is_none());
    }
}
