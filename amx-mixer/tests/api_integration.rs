//! Integration tests for the amx-mixer HTTP API
//!
//! Drives the real router end to end: assets come from a local HTTP
//! server, the mix is published through a `LocalPublisher` into a temp dir.

mod helpers;

use amx_common::config::FetchConfig;
use amx_mixer::api::{create_router, AppContext};
use amx_mixer::audio::{SimpleDecoder, TARGET_SAMPLE_RATE};
use amx_mixer::config::PipelineSettings;
use amx_mixer::pipeline::Pipeline;
use amx_mixer::publisher::LocalPublisher;
use amx_mixer::stager::HttpStager;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use helpers::asset_server::spawn_asset_server;
use helpers::audio_generator::sine_wav_bytes;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BASE_URL: &str = "http://media.test";

struct TestApp {
    router: axum::Router,
    assets: String,
    published: TempDir,
    staging: TempDir,
}

async fn setup_test_app() -> TestApp {
    let assets = spawn_asset_server(vec![
        ("bg.wav", sine_wav_bytes(TARGET_SAMPLE_RATE, 3000, 110.0, 0.3)),
        ("v1.wav", sine_wav_bytes(TARGET_SAMPLE_RATE, 500, 440.0, 0.4)),
        ("v2.wav", sine_wav_bytes(22050, 500, 660.0, 0.4)),
    ])
    .await;

    let published = tempfile::tempdir().unwrap();
    let staging = tempfile::tempdir().unwrap();

    let pipeline = Pipeline::new(
        Arc::new(HttpStager::new(&FetchConfig::default()).unwrap()),
        Arc::new(LocalPublisher::new(
            published.path().to_path_buf(),
            BASE_URL.to_string(),
        )),
        PipelineSettings {
            temp_dir: Some(staging.path().to_path_buf()),
            key_prefix: "final_audio".to_string(),
            bitrate_kbps: 192,
            max_voices: 4,
        },
    )
    .unwrap();

    TestApp {
        router: create_router(AppContext::new(pipeline)),
        assets,
        published,
        staging,
    }
}

async fn make_request(
    app: &axum::Router,
    method: Method,
    path: &str,
    body: Option<String>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(path);
    if body.is_some() {
        request = request.header("content-type", "application/json");
    }
    let request = request
        .body(body.map(Body::from).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn post_generate(app: &axum::Router, body: Value) -> (StatusCode, Value) {
    make_request(app, Method::POST, "/generate-audio", Some(body.to_string())).await
}

// =============================================================================
// Service info
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_test_app().await;
    let (status, body) = make_request(&app.router, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "amx-mixer");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_build_info_endpoint() {
    let app = setup_test_app().await;
    let (status, body) = make_request(&app.router, Method::GET, "/build_info", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["git_hash"].is_string());
    assert!(body["build_timestamp"].is_string());
    assert!(body["build_profile"].is_string());
}

// =============================================================================
// Generate audio
// =============================================================================

#[tokio::test]
async fn test_generate_audio_success() {
    let app = setup_test_app().await;
    let (status, body) = post_generate(
        &app.router,
        json!({
            "response_id": "resp42",
            "voice_urls": [
                format!("{}/v1.wav", app.assets),
                format!("{}/v2.wav", app.assets),
            ],
            "background_music_url": format!("{}/bg.wav", app.assets),
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["status"], "success");

    let url = body["audio_url"].as_str().unwrap();
    let key = url
        .strip_prefix(&format!("{}/", BASE_URL))
        .expect("url under base");
    assert!(key.starts_with("final_audio/final_resp42_"), "key {}", key);
    assert!(key.ends_with(".mp3"));

    let file = app.published.path().join(key);
    assert!(file.exists());

    // 7 loops x 2 voices of 0.5s: last starts at 13 * 2.5 = 32.5s
    let decoded = SimpleDecoder::decode_file(&file).unwrap();
    assert_eq!(decoded.sample_rate, TARGET_SAMPLE_RATE);
    assert_eq!(decoded.channels, 2);
    assert!(
        (decoded.duration_secs() - 33.0).abs() < 0.2,
        "decoded duration {}",
        decoded.duration_secs()
    );
    assert!(decoded.peak() > 0.0);

    // Staging areas are gone once the response is sent
    assert!(std::fs::read_dir(app.staging.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn test_missing_asset_returns_fetch_error() {
    let app = setup_test_app().await;
    let (status, body) = post_generate(
        &app.router,
        json!({
            "response_id": "resp43",
            "voice_urls": [format!("{}/gone.mp3", app.assets)],
            "background_music_url": format!("{}/bg.wav", app.assets),
        }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert_eq!(body["error_kind"], "fetch_error");
    assert!(body["message"].as_str().unwrap().contains("404"));

    // Nothing published
    assert!(std::fs::read_dir(app.published.path()).unwrap().next().is_none());
    assert!(std::fs::read_dir(app.staging.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn test_malformed_json_is_invalid_input() {
    let app = setup_test_app().await;
    let (status, body) = make_request(
        &app.router,
        Method::POST,
        "/generate-audio",
        Some("{not json".to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert_eq!(body["error_kind"], "invalid_input");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_missing_field_is_invalid_input() {
    let app = setup_test_app().await;
    let (status, body) = post_generate(
        &app.router,
        json!({
            "response_id": "resp44",
            "voice_urls": [],
        }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error_kind"], "invalid_input");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("background_music_url"));
}

#[tokio::test]
async fn test_unsafe_response_id_is_rejected() {
    let app = setup_test_app().await;
    let (status, body) = post_generate(
        &app.router,
        json!({
            "response_id": "../../escape",
            "voice_urls": [],
            "background_music_url": format!("{}/bg.wav", app.assets),
        }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error_kind"], "invalid_input");
}

#[tokio::test]
async fn test_too_many_voices_is_invalid_input() {
    let app = setup_test_app().await;
    let voices = vec![format!("{}/v1.wav", app.assets); 5];
    let (status, body) = post_generate(
        &app.router,
        json!({
            "response_id": "resp45",
            "voice_urls": voices,
            "background_music_url": format!("{}/bg.wav", app.assets),
        }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error_kind"], "invalid_input");
    assert!(body["message"].as_str().unwrap().contains("at most 4"));
    assert!(std::fs::read_dir(app.staging.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = setup_test_app().await;
    let (status, _) = make_request(&app.router, Method::GET, "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
