//! Shared API request/response types
//!
//! Wire shapes for the AMX HTTP boundary. The request body is what the
//! content pipeline posts to `/generate-audio`; the two response bodies are
//! the only shapes a caller will ever see from that endpoint.

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind};

// ========================================
// Generate Audio
// ========================================

/// Body of `POST /generate-audio`
///
/// # Examples
///
/// ```
/// use amx_common::api::types::GenerateAudioRequest;
///
/// let body = r#"{
///     "response_id": "resp42",
///     "voice_urls": ["https://cdn.example.com/v1.mp3"],
///     "background_music_url": "https://cdn.example.com/bg.mp3"
/// }"#;
/// let request: GenerateAudioRequest = serde_json::from_str(body).unwrap();
/// assert_eq!(request.voice_urls.len(), 1);
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerateAudioRequest {
    /// Caller's identifier, embedded in the published object key
    pub response_id: String,

    /// Voice track URLs; order determines stagger position
    pub voice_urls: Vec<String>,

    /// Background music URL
    pub background_music_url: String,
}

/// Success body: `{ "status": "success", "audio_url": "..." }`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerateAudioSuccess {
    pub status: String,
    pub audio_url: String,
}

impl GenerateAudioSuccess {
    pub fn new(audio_url: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            audio_url: audio_url.into(),
        }
    }
}

/// Failure body: `{ "status": "error", "message": "...", "error_kind": "..." }`
///
/// `message` is always present. `error_kind` is the stable classification
/// added on top of it.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateAudioFailure {
    pub status: String,
    pub message: String,
    pub error_kind: ErrorKind,
}

impl From<&Error> for GenerateAudioFailure {
    fn from(err: &Error) -> Self {
        Self {
            status: "error".to_string(),
            message: err.to_string(),
            error_kind: err.kind(),
        }
    }
}

// ========================================
// Service Info
// ========================================

/// Health check response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// Build identification response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuildInfo {
    pub version: String,
    pub git_hash: String,
    pub build_timestamp: String,
    pub build_profile: String,
}
