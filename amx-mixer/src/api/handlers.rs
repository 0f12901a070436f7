//! HTTP request handlers

use crate::api::server::AppContext;
use amx_common::api::{
    BuildInfo, GenerateAudioFailure, GenerateAudioRequest, GenerateAudioSuccess, HealthResponse,
};
use amx_common::Error;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use tracing::error;

type FailureResponse = (StatusCode, Json<GenerateAudioFailure>);

// ============================================================================
// Generate Audio
// ============================================================================

/// POST /generate-audio - Mix the requested assets and publish the result
///
/// Every failure, including an unparseable body, comes back as HTTP 500
/// with `{ "status": "error", "message": ..., "error_kind": ... }`.
pub async fn generate_audio(
    State(ctx): State<AppContext>,
    payload: Result<Json<GenerateAudioRequest>, JsonRejection>,
) -> Result<Json<GenerateAudioSuccess>, FailureResponse> {
    let Json(request) = payload.map_err(|rejection| {
        failure(Error::InvalidInput(rejection.body_text()), "<unparsed>")
    })?;

    match ctx.pipeline.generate(&request).await {
        Ok(audio_url) => Ok(Json(GenerateAudioSuccess::new(audio_url))),
        Err(e) => Err(failure(e, &request.response_id)),
    }
}

fn failure(err: Error, response_id: &str) -> FailureResponse {
    error!(
        "generate-audio failed for response_id={} [{}]: {}",
        response_id,
        err.kind(),
        err
    );
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(GenerateAudioFailure::from(&err)),
    )
}

// ============================================================================
// Service Info
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "amx-mixer".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /build_info - Build identification
pub async fn build_info() -> Json<BuildInfo> {
    Json(BuildInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: env!("GIT_HASH").to_string(),
        build_timestamp: env!("BUILD_TIMESTAMP").to_string(),
        build_profile: env!("BUILD_PROFILE").to_string(),
    })
}
