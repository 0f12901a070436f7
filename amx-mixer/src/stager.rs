//! Asset staging
//!
//! Resolves remote URLs into decoded [`AudioTrack`]s at the pipeline rate.
//! Downloaded bytes land in a [`StagingArea`]: a temp directory private to
//! one request, removed when the area is dropped, whichever way the request
//! ends.

use crate::audio::{AudioTrack, Resampler, SimpleDecoder};
use amx_common::config::FetchConfig;
use amx_common::{uuid_utils, Error, Result};
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Extension assumed when the URL does not carry one
const DEFAULT_EXTENSION: &str = "mp3";

/// What a staged asset is used for; decides its file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetRole {
    Background,
    /// Zero-based position in the voice list
    Voice(usize),
}

impl fmt::Display for AssetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetRole::Background => write!(f, "background"),
            AssetRole::Voice(index) => write!(f, "voice_{}", index + 1),
        }
    }
}

/// Request-scoped temporary directory
///
/// Named `amx-<uid>-XXXX` so concurrent requests never share a path.
#[derive(Debug)]
pub struct StagingArea {
    dir: TempDir,
    uid: String,
}

impl StagingArea {
    /// Create a fresh area under `parent` (or the OS temp dir).
    pub fn create(parent: Option<&Path>) -> Result<Self> {
        let uid = uuid_utils::short_uid();
        let prefix = format!("amx-{}-", uid);
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);

        let dir = match parent {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                builder.tempdir_in(parent)?
            }
            None => builder.tempdir()?,
        };

        debug!("Created staging area {}", dir.path().display());
        Ok(Self { dir, uid })
    }

    /// Short identifier scoping this request's artifacts
    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path for a file inside the area
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Remove the area now, reporting failures instead of swallowing them.
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        debug!("Removed staging area {}", path.display());
        Ok(())
    }
}

/// Resolves one URL into a decoded track
#[async_trait]
pub trait AssetStager: Send + Sync {
    /// Fetch `url`, store it in `area` under a name derived from `role`,
    /// and decode it to a stereo track at the pipeline rate.
    async fn stage(&self, url: &str, role: AssetRole, area: &StagingArea) -> Result<AudioTrack>;
}

/// Stager that downloads over HTTP(S)
pub struct HttpStager {
    client: reqwest::Client,
    max_asset_bytes: u64,
}

impl HttpStager {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("amx-mixer/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_asset_bytes: config.max_asset_bytes,
        })
    }

    /// Download the whole body, enforcing the size limit while streaming.
    async fn fetch(&self, url: &reqwest::Url) -> Result<Vec<u8>> {
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::Fetch(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!("HTTP {} fetching {}", status, url)));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_asset_bytes {
                return Err(Error::Fetch(format!(
                    "{} is {} bytes, limit is {}",
                    url, length, self.max_asset_bytes
                )));
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Error::Fetch(format!("Reading body of {} failed: {}", url, e)))?
        {
            if body.len() as u64 + chunk.len() as u64 > self.max_asset_bytes {
                return Err(Error::Fetch(format!(
                    "{} exceeds the {} byte limit",
                    url, self.max_asset_bytes
                )));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }
}

#[async_trait]
impl AssetStager for HttpStager {
    async fn stage(&self, url: &str, role: AssetRole, area: &StagingArea) -> Result<AudioTrack> {
        let parsed = parse_asset_url(url)?;

        let bytes = self.fetch(&parsed).await?;
        if bytes.is_empty() {
            warn!("{} returned an empty body", url);
        }

        let path = area.file_path(&format!("{}.{}", role, url_extension(&parsed)));
        tokio::fs::write(&path, &bytes).await?;
        info!("Fetched {} ({} bytes) -> {}", role, bytes.len(), path.display());

        decode_staged(path).await
    }
}

/// Decode and resample a staged file on the blocking pool.
pub async fn decode_staged(path: PathBuf) -> Result<AudioTrack> {
    tokio::task::spawn_blocking(move || {
        SimpleDecoder::decode_file(&path).and_then(Resampler::to_target_rate)
    })
    .await
    .map_err(|e| Error::Internal(format!("Decode task failed: {}", e)))?
}

fn parse_asset_url(url: &str) -> Result<reqwest::Url> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| Error::InvalidInput(format!("Invalid asset URL '{}': {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(Error::InvalidInput(format!(
            "Unsupported URL scheme '{}' in '{}'",
            other, url
        ))),
    }
}

/// File extension taken from the URL path, used only as a decoder hint.
fn url_extension(url: &reqwest::Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}
