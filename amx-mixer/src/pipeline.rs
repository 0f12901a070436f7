//! Generate-audio pipeline
//!
//! Stager → compositor → encoder → publisher, strictly in that order with
//! no retries. The first failure aborts the request and nothing is
//! published. All intermediate files live in one [`StagingArea`] that is
//! removed on every exit path.

use crate::audio::{AudioTrack, Mp3Encoder};
use crate::config::PipelineSettings;
use crate::mixer::{self, LayeringConfig, MixRequest};
use crate::publisher::{object_key, Publisher};
use crate::stager::{AssetRole, AssetStager, StagingArea};
use amx_common::api::GenerateAudioRequest;
use amx_common::{Error, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Shared, immutable pipeline wiring; one instance serves all requests.
pub struct Pipeline {
    stager: Arc<dyn AssetStager>,
    publisher: Arc<dyn Publisher>,
    encoder: Mp3Encoder,
    layering: LayeringConfig,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        stager: Arc<dyn AssetStager>,
        publisher: Arc<dyn Publisher>,
        settings: PipelineSettings,
    ) -> Result<Self> {
        let encoder = Mp3Encoder::new(settings.bitrate_kbps)?;
        Ok(Self {
            stager,
            publisher,
            encoder,
            layering: LayeringConfig::default(),
            settings,
        })
    }

    /// Run the full pipeline for one request and return the public URL.
    pub async fn generate(&self, request: &GenerateAudioRequest) -> Result<String> {
        validate_request(request, self.settings.max_voices)?;

        let started = Instant::now();
        let area = StagingArea::create(self.settings.temp_dir.as_deref())?;
        info!(
            "Generating audio for response_id={} uid={} ({} voice(s))",
            request.response_id,
            area.uid(),
            request.voice_urls.len()
        );

        let result = self.run(request, &area).await;

        let uid = area.uid().to_string();
        if let Err(e) = area.close() {
            warn!("Failed to remove staging area for uid={}: {}", uid, e);
        }

        if let Ok(url) = &result {
            info!(
                "Finished response_id={} uid={} in {:.2}s: {}",
                request.response_id,
                uid,
                started.elapsed().as_secs_f64(),
                url
            );
        }
        result
    }

    async fn run(&self, request: &GenerateAudioRequest, area: &StagingArea) -> Result<String> {
        let (background, voices) = stage_all(self.stager.as_ref(), request, area).await?;

        let mix_request = MixRequest::with_layering(background, voices, self.layering.clone());
        let output_path =
            area.file_path(&format!("final_{}_{}.mp3", request.response_id, area.uid()));

        let encoder = self.encoder;
        let path = output_path.clone();
        let total_duration = tokio::task::spawn_blocking(move || -> Result<f64> {
            let mixed = mixer::compose(&mix_request)?;
            encoder.encode_to_file(&mixed.track, &path)?;
            Ok(mixed.total_duration)
        })
        .await
        .map_err(|e| Error::Internal(format!("Mix task failed: {}", e)))??;

        info!(
            "Mixed uid={} to {:.2}s, publishing",
            area.uid(),
            total_duration
        );

        let key = object_key(&self.settings.key_prefix, &request.response_id, area.uid());
        self.publisher.publish(&output_path, &key).await
    }
}

/// Stage the background and every voice concurrently.
///
/// Voices come back in request order. The first failure wins; in-flight
/// downloads are dropped with it.
pub async fn stage_all(
    stager: &dyn AssetStager,
    request: &GenerateAudioRequest,
    area: &StagingArea,
) -> Result<(AudioTrack, Vec<AudioTrack>)> {
    let background = stager.stage(&request.background_music_url, AssetRole::Background, area);
    let voices = futures::future::try_join_all(
        request
            .voice_urls
            .iter()
            .enumerate()
            .map(|(index, url)| stager.stage(url, AssetRole::Voice(index), area)),
    );

    futures::try_join!(background, voices)
}

/// Reject requests that cannot produce a well-formed object key, lack
/// required assets, or carry more than `max_voices` voices.
pub fn validate_request(request: &GenerateAudioRequest, max_voices: usize) -> Result<()> {
    let id = &request.response_id;
    if id.is_empty() {
        return Err(Error::InvalidInput("response_id is required".to_string()));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        || id.starts_with('.')
    {
        return Err(Error::InvalidInput(format!(
            "response_id '{}' may only contain letters, digits, '-', '_' and '.'",
            id
        )));
    }

    if request.background_music_url.trim().is_empty() {
        return Err(Error::InvalidInput("background_music_url is required".to_string()));
    }

    if request.voice_urls.len() > max_voices {
        return Err(Error::InvalidInput(format!(
            "{} voice_urls given, at most {} allowed",
            request.voice_urls.len(),
            max_voices
        )));
    }

    if let Some(index) = request.voice_urls.iter().position(|u| u.trim().is_empty()) {
        return Err(Error::InvalidInput(format!("voice_urls[{}] is empty", index)));
    }

    Ok(())
}
