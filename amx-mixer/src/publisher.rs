//! Publishing finished mixes
//!
//! A [`Publisher`] takes the encoded file out of the staging area and makes
//! it reachable at a public URL. Uploads are single-shot: no retry, no
//! multipart.

use amx_common::config::{StorageBackend, StorageConfig};
use amx_common::{Error, Result};
use async_trait::async_trait;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::region::Region;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Content type of every published object
pub const CONTENT_TYPE: &str = "audio/mpeg";

/// Object key for one finished mix: `<prefix>/final_<response_id>_<uid>.mp3`
pub fn object_key(prefix: &str, response_id: &str, uid: &str) -> String {
    let file_name = format!("final_{}_{}.mp3", response_id, uid);
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        file_name
    } else {
        format!("{}/{}", prefix, file_name)
    }
}

/// Makes a local file publicly retrievable
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Upload `file` under `key` and return its public URL.
    async fn publish(&self, file: &Path, key: &str) -> Result<String>;
}

/// Build the publisher selected by `config.backend`.
pub fn from_config(config: &StorageConfig) -> Result<Arc<dyn Publisher>> {
    match config.backend {
        StorageBackend::S3 => Ok(Arc::new(S3Publisher::new(config)?)),
        StorageBackend::Local => Ok(Arc::new(LocalPublisher::new(
            config.local_dir.clone(),
            config.local_base_url.clone(),
        ))),
    }
}

/// Publisher backed by S3 or an S3-compatible store
pub struct S3Publisher {
    bucket: Box<Bucket>,
    public_host: String,
}

impl S3Publisher {
    /// Credentials come from the standard AWS environment/profile chain.
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let region = match &config.endpoint {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config
                .region
                .parse::<Region>()
                .map_err(|e| Error::Config(format!("Invalid region '{}': {}", config.region, e)))?,
        };

        let credentials = Credentials::default()
            .map_err(|e| Error::Config(format!("AWS credentials unavailable: {}", e)))?;

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| Error::Config(format!("Invalid bucket '{}': {}", config.bucket, e)))?;
        if config.endpoint.is_some() {
            bucket = bucket.with_path_style();
        }

        Ok(Self {
            bucket,
            public_host: config.resolved_public_host(),
        })
    }
}

#[async_trait]
impl Publisher for S3Publisher {
    async fn publish(&self, file: &Path, key: &str) -> Result<String> {
        let content = tokio::fs::read(file).await?;

        let response = self
            .bucket
            .put_object_with_content_type(key, &content, CONTENT_TYPE)
            .await
            .map_err(|e| Error::Upload(format!("PUT {} failed: {}", key, e)))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(Error::Upload(format!("PUT {} returned HTTP {}", key, status)));
        }

        let url = public_url(&self.public_host, key);
        info!("Uploaded {} bytes to {}", content.len(), url);
        Ok(url)
    }
}

/// `https://<host>/<key>`
pub fn public_url(host: &str, key: &str) -> String {
    format!("https://{}/{}", host.trim_end_matches('/'), key)
}

/// Publisher that copies into a local directory
///
/// For development and tests, typically behind a static file server that
/// serves `root` at `base_url`.
pub struct LocalPublisher {
    root: PathBuf,
    base_url: String,
}

impl LocalPublisher {
    pub fn new(root: PathBuf, base_url: String) -> Self {
        Self { root, base_url }
    }
}

#[async_trait]
impl Publisher for LocalPublisher {
    async fn publish(&self, file: &Path, key: &str) -> Result<String> {
        if key.split('/').any(|part| part == ".." || part.is_empty()) {
            return Err(Error::Upload(format!("Refusing unsafe object key '{}'", key)));
        }

        let destination = self.root.join(key);
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Upload(format!("Creating {}: {}", parent.display(), e)))?;
        }
        tokio::fs::copy(file, &destination)
            .await
            .map_err(|e| Error::Upload(format!("Copying to {}: {}", destination.display(), e)))?;

        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), key);
        info!("Published {} -> {}", destination.display(), url);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_layout() {
        assert_eq!(
            object_key("final_audio", "resp42", "1a2b3c4d"),
            "final_audio/final_resp42_1a2b3c4d.mp3"
        );
        assert_eq!(object_key("/nested/dir/", "r", "u"), "nested/dir/final_r_u.mp3");
        assert_eq!(object_key("", "r", "u"), "final_r_u.mp3");
    }

    #[test]
    fn test_public_url() {
        assert_eq!(
            public_url("affirmation.maker.media.s3.amazonaws.com", "final_audio/a.mp3"),
            "https://affirmation.maker.media.s3.amazonaws.com/final_audio/a.mp3"
        );
    }

    #[tokio::test]
    async fn test_local_publisher_copies_file() {
        let staging = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let file = staging.path().join("final.mp3");
        std::fs::write(&file, b"ID3fake").unwrap();

        let publisher =
            LocalPublisher::new(out.path().to_path_buf(), "http://media.local/".to_string());
        let url = publisher.publish(&file, "final_audio/final_r_u.mp3").await.unwrap();

        assert_eq!(url, "http://media.local/final_audio/final_r_u.mp3");
        let copied = std::fs::read(out.path().join("final_audio/final_r_u.mp3")).unwrap();
        assert_eq!(copied, b"ID3fake");
    }

    #[tokio::test]
    async fn test_local_publisher_rejects_traversal() {
        let out = tempfile::tempdir().unwrap();
        let publisher = LocalPublisher::new(out.path().to_path_buf(), "http://x".to_string());
        let result = publisher.publish(Path::new("/dev/null"), "../escape.mp3").await;
        assert!(matches!(result, Err(Error::Upload(_))));
    }

    #[tokio::test]
    async fn test_local_publisher_missing_source_is_upload_error() {
        let out = tempfile::tempdir().unwrap();
        let publisher = LocalPublisher::new(out.path().to_path_buf(), "http://x".to_string());
        let result = publisher
            .publish(Path::new("/nonexistent/amx/final.mp3"), "final_audio/k.mp3")
            .await;
        assert!(matches!(result, Err(Error::Upload(_))));
    }
}
