//! Common error types for AMX
//!
//! Every failure in the generate-audio pipeline maps onto one variant here.
//! The variant decides the stable [`ErrorKind`] reported to HTTP callers,
//! while the `Display` text becomes the human-readable message.

use serde::Serialize;
use thiserror::Error;

/// Common result type for AMX operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the stager, compositor, encoder and publisher
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or missing request fields, or compositor preconditions on
    /// caller-supplied values (zero-length track, bad loop count)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Remote asset unreachable or rejected by the remote server
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Asset bytes are not valid audio
    #[error("Decode error: {0}")]
    Decode(String),

    /// Internal compositor precondition violated
    #[error("Mix error: {0}")]
    Mix(String),

    /// MP3 encoding failed
    #[error("Encode error: {0}")]
    Encode(String),

    /// Publish step failed
    #[error("Upload error: {0}")]
    Upload(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Machine-readable error classification
///
/// Serialized as snake_case (`fetch_error`, `invalid_input`, ...). These
/// strings are part of the HTTP contract and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    FetchError,
    DecodeError,
    MixError,
    EncodeError,
    UploadError,
    IoError,
    ConfigError,
    InternalError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::FetchError => "fetch_error",
            ErrorKind::DecodeError => "decode_error",
            ErrorKind::MixError => "mix_error",
            ErrorKind::EncodeError => "encode_error",
            ErrorKind::UploadError => "upload_error",
            ErrorKind::IoError => "io_error",
            ErrorKind::ConfigError => "config_error",
            ErrorKind::InternalError => "internal_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Stable classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::Fetch(_) => ErrorKind::FetchError,
            Error::Decode(_) => ErrorKind::DecodeError,
            Error::Mix(_) => ErrorKind::MixError,
            Error::Encode(_) => ErrorKind::EncodeError,
            Error::Upload(_) => ErrorKind::UploadError,
            Error::Io(_) => ErrorKind::IoError,
            Error::Config(_) => ErrorKind::ConfigError,
            Error::Internal(_) => ErrorKind::InternalError,
        }
    }
}
