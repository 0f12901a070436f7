//! Superposition of the background and placed voices
//!
//! Pure and synchronous: one [`MixRequest`] in, one [`MixResult`] out, no
//! I/O. The pipeline runs it on a blocking thread.

use crate::audio::types::AudioTrack;
use crate::mixer::layout::{
    self, BackgroundExtension, LayeringConfig, OverflowPolicy, Placement, PlacedTrack,
    MAX_TIMELINE_SECS,
};
use amx_common::{Error, Result};
use tracing::debug;

/// Input to one compositor invocation
///
/// The background is a required constructor argument, so a request without
/// one cannot be built.
#[derive(Debug, Clone)]
pub struct MixRequest {
    pub background: AudioTrack,
    /// Order determines stagger position
    pub voices: Vec<AudioTrack>,
    pub layering: LayeringConfig,
}

impl MixRequest {
    /// Build a request with the default layering.
    pub fn new(background: AudioTrack, voices: Vec<AudioTrack>) -> Self {
        Self::with_layering(background, voices, LayeringConfig::default())
    }

    /// Build a request, stamping the layering gains onto every track.
    pub fn with_layering(
        background: AudioTrack,
        voices: Vec<AudioTrack>,
        layering: LayeringConfig,
    ) -> Self {
        let background = background.with_gain(layering.background_gain);
        let voices = voices
            .into_iter()
            .map(|v| v.with_gain(layering.voice_gain))
            .collect();
        Self {
            background,
            voices,
            layering,
        }
    }
}

/// Mixed output of one compositor invocation
#[derive(Debug, Clone)]
pub struct MixResult {
    /// Mixed signal, unity gain, same rate and layout as the inputs
    pub track: AudioTrack,
    /// Latest end time across background and voice instances, in seconds
    pub total_duration: f64,
    /// Every voice instance in flattening order
    pub placements: Vec<Placement>,
}

/// Mix the background and all staggered voice instances into one track.
///
/// # Errors
/// - [`Error::InvalidInput`] for `loop_count == 0`, a negative or
///   non-finite `delay_increment`, any zero-length track, or a layout
///   running past [`MAX_TIMELINE_SECS`]
/// - [`Error::Mix`] when a voice's sample rate or channel count differs
///   from the background's, or the buffer size does not fit in memory
///   addressing
pub fn compose(request: &MixRequest) -> Result<MixResult> {
    validate(request)?;

    let background = &request.background;
    let layering = &request.layering;
    let sample_rate = background.sample_rate;
    let channels = background.channels as usize;

    let placed = layout::layout(&request.voices, layering.loop_count, layering.delay_increment);
    let total_duration = layout::total_duration(background, &placed);
    if total_duration > MAX_TIMELINE_SECS {
        return Err(Error::InvalidInput(format!(
            "mix would last {:.1}s, limit is {}s",
            total_duration, MAX_TIMELINE_SECS
        )));
    }

    let total_frames = placed
        .iter()
        .try_fold(background.frames(), |frames, p| {
            p.start_frame(sample_rate)
                .checked_add(p.track.frames())
                .map(|end| frames.max(end))
        })
        .filter(|frames| frames.checked_mul(channels).is_some())
        .ok_or_else(|| {
            Error::Mix(format!("{:.1}s timeline cannot be addressed", total_duration))
        })?;

    debug!(
        "Composing {} voice instance(s) over {:.3}s ({} frames at {}Hz)",
        placed.len(),
        total_duration,
        total_frames,
        sample_rate
    );

    let mut mix = vec![0.0f32; total_frames * channels];

    add_background(&mut mix, background, layering.background_extension);
    for instance in &placed {
        add_placed(&mut mix, instance, sample_rate, channels);
    }

    apply_overflow_policy(&mut mix, layering.overflow);

    Ok(MixResult {
        track: AudioTrack::new(mix, sample_rate, background.channels),
        total_duration,
        placements: placed.iter().map(PlacedTrack::summary).collect(),
    })
}

fn validate(request: &MixRequest) -> Result<()> {
    let layering = &request.layering;

    if layering.loop_count < 1 {
        return Err(Error::InvalidInput("loop_count must be at least 1".to_string()));
    }
    if !layering.delay_increment.is_finite() || layering.delay_increment < 0.0 {
        return Err(Error::InvalidInput(format!(
            "delay_increment must be a non-negative number of seconds, got {}",
            layering.delay_increment
        )));
    }

    let background = &request.background;
    if background.is_empty() || background.sample_rate == 0 {
        return Err(Error::InvalidInput("background track has zero duration".to_string()));
    }

    for (index, voice) in request.voices.iter().enumerate() {
        if voice.is_empty() || voice.sample_rate == 0 {
            return Err(Error::InvalidInput(format!(
                "voice track {} has zero duration",
                index + 1
            )));
        }
        if voice.sample_rate != background.sample_rate {
            return Err(Error::Mix(format!(
                "voice track {} is {}Hz but background is {}Hz",
                index + 1,
                voice.sample_rate,
                background.sample_rate
            )));
        }
        if voice.channels != background.channels {
            return Err(Error::Mix(format!(
                "voice track {} has {} channel(s) but background has {}",
                index + 1,
                voice.channels,
                background.channels
            )));
        }
    }

    Ok(())
}

/// Lay the gain-scaled background across the mix buffer from frame zero.
fn add_background(mix: &mut [f32], background: &AudioTrack, extension: BackgroundExtension) {
    let gain = background.gain;
    match extension {
        BackgroundExtension::PadSilence => {
            for (out, &s) in mix.iter_mut().zip(&background.samples) {
                *out += s * gain;
            }
        }
        BackgroundExtension::Loop => {
            for (out, &s) in mix.iter_mut().zip(background.samples.iter().cycle()) {
                *out += s * gain;
            }
        }
    }
}

/// Add one gain-scaled voice instance at its start frame.
fn add_placed(mix: &mut [f32], instance: &PlacedTrack<'_>, sample_rate: u32, channels: usize) {
    let start = instance.start_frame(sample_rate) * channels;
    let gain = instance.track.gain;
    for (out, &s) in mix[start..].iter_mut().zip(&instance.track.samples) {
        *out += s * gain;
    }
}

fn apply_overflow_policy(mix: &mut [f32], policy: OverflowPolicy) {
    match policy {
        OverflowPolicy::Clamp => {
            for s in mix.iter_mut() {
                *s = s.clamp(-1.0, 1.0);
            }
        }
        OverflowPolicy::PeakNormalize => {
            let peak = mix.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
            if peak > 1.0 {
                let scale = 1.0 / peak;
                for s in mix.iter_mut() {
                    *s *= scale;
                }
            }
        }
    }
}
