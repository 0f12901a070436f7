//! Shared API types for AMX

pub mod types;

pub use types::{
    BuildInfo, GenerateAudioFailure, GenerateAudioRequest, GenerateAudioSuccess, HealthResponse,
};
