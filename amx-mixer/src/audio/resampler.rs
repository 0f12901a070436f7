//! Audio resampling using rubato
//!
//! Brings every staged track to the pipeline rate so the compositor can
//! align tracks by frame index. Output length is `round(frames * ratio)`:
//! the filter delay is trimmed from the front and the tail is flushed.

use crate::audio::types::AudioTrack;
use amx_common::{Error, Result};
use rubato::{FastFixedIn, PolynomialDegree, Resampler as RubatoResampler};
use tracing::debug;

/// Sample rate of every mixed and encoded output
pub const TARGET_SAMPLE_RATE: u32 = 44100;

/// Audio resampler using rubato.
pub struct Resampler;

impl Resampler {
    /// Convert a track to [`TARGET_SAMPLE_RATE`].
    ///
    /// Tracks already at the target rate are returned unchanged.
    pub fn to_target_rate(track: AudioTrack) -> Result<AudioTrack> {
        if track.sample_rate == TARGET_SAMPLE_RATE {
            debug!("Sample rate already at {}Hz, skipping resample", TARGET_SAMPLE_RATE);
            return Ok(track);
        }

        let samples = Self::resample(&track.samples, track.sample_rate, track.channels)?;
        Ok(AudioTrack {
            samples,
            sample_rate: TARGET_SAMPLE_RATE,
            channels: track.channels,
            gain: track.gain,
        })
    }

    /// Resample interleaved samples from `input_rate` to [`TARGET_SAMPLE_RATE`].
    pub fn resample(input: &[f32], input_rate: u32, channels: u16) -> Result<Vec<f32>> {
        let output_rate = TARGET_SAMPLE_RATE;

        if input_rate == output_rate {
            return Ok(input.to_vec());
        }
        if input_rate == 0 || channels == 0 {
            return Err(Error::Decode(format!(
                "Cannot resample: rate={}Hz channels={}",
                input_rate, channels
            )));
        }

        debug!(
            "Resampling from {}Hz to {}Hz ({} channels)",
            input_rate, output_rate, channels
        );

        let planar_input = Self::deinterleave(input, channels);
        let input_frames = planar_input[0].len();
        if input_frames == 0 {
            return Ok(Vec::new());
        }

        // One chunk covering the whole track: staged assets are already
        // fully in memory, so there is nothing to stream.
        let ratio = output_rate as f64 / input_rate as f64;
        let mut resampler = FastFixedIn::<f32>::new(
            ratio,
            1.0,
            PolynomialDegree::Septic,
            input_frames,
            channels as usize,
        )
        .map_err(|e| Error::Decode(format!("Failed to create resampler: {}", e)))?;

        let delay = resampler.output_delay();
        let expected_frames = (input_frames as f64 * ratio).round() as usize;

        let mut planar_output = resampler
            .process(&planar_input, None)
            .map_err(|e| Error::Decode(format!("Resampling failed: {}", e)))?;

        // Flush the filter until the delayed tail is out
        while planar_output[0].len() < delay + expected_frames {
            let tail = resampler
                .process_partial(None::<&[Vec<f32>]>, None)
                .map_err(|e| Error::Decode(format!("Resampler flush failed: {}", e)))?;
            if tail[0].is_empty() {
                break;
            }
            for (channel, rest) in planar_output.iter_mut().zip(tail) {
                channel.extend(rest);
            }
        }

        for channel in planar_output.iter_mut() {
            channel.drain(..delay.min(channel.len()));
            channel.truncate(expected_frames);
        }

        let interleaved_output = Self::interleave(planar_output);

        debug!(
            "Resampled {} input frames to {} output frames",
            input_frames,
            interleaved_output.len() / channels as usize
        );

        Ok(interleaved_output)
    }

    /// Convert interleaved samples to planar format.
    ///
    /// Input:  [L, R, L, R, L, R, ...]
    /// Output: [[L, L, L, ...], [R, R, R, ...]]
    fn deinterleave(samples: &[f32], channels: u16) -> Vec<Vec<f32>> {
        let num_channels = channels as usize;
        let num_frames = samples.len() / num_channels;

        let mut planar = vec![Vec::with_capacity(num_frames); num_channels];
        for frame in samples.chunks_exact(num_channels) {
            for (ch, &sample) in frame.iter().enumerate() {
                planar[ch].push(sample);
            }
        }
        planar
    }

    /// Convert planar samples to interleaved format.
    fn interleave(planar: Vec<Vec<f32>>) -> Vec<f32> {
        if planar.is_empty() {
            return Vec::new();
        }

        let num_channels = planar.len();
        let num_frames = planar[0].len();
        let mut interleaved = Vec::with_capacity(num_frames * num_channels);

        for frame_idx in 0..num_frames {
            for channel in &planar {
                interleaved.push(channel[frame_idx]);
            }
        }
        interleaved
    }
}
