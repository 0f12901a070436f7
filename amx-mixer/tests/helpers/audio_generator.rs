//! Audio fixture generation
//!
//! Deterministic WAV bytes and in-memory tracks with known length and
//! amplitude, for checking offsets and durations through the pipeline.

use amx_mixer::audio::{AudioTrack, STEREO, TARGET_SAMPLE_RATE};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::f32::consts::PI;
use std::io::Cursor;

/// Stereo 16-bit sine wave WAV file contents
pub fn sine_wav_bytes(
    sample_rate: u32,
    duration_ms: u64,
    frequency_hz: f32,
    amplitude: f32,
) -> Vec<u8> {
    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).expect("wav header");
        let total_frames = (sample_rate as u64 * duration_ms) / 1000;
        for frame_idx in 0..total_frames {
            let t = frame_idx as f32 / sample_rate as f32;
            let value = ((2.0 * PI * frequency_hz * t).sin() * amplitude * i16::MAX as f32) as i16;
            writer.write_sample(value).expect("left");
            writer.write_sample(value).expect("right");
        }
        writer.finalize().expect("finalize wav");
    }
    cursor.into_inner()
}

/// Constant-amplitude stereo track at the pipeline rate
pub fn constant_track(seconds: f64, value: f32) -> AudioTrack {
    let frames = (seconds * TARGET_SAMPLE_RATE as f64).round() as usize;
    AudioTrack::new(vec![value; frames * STEREO as usize], TARGET_SAMPLE_RATE, STEREO)
}

/// Track whose every frame equals `value`, at an arbitrary low rate for
/// cheap arithmetic checks
pub fn constant_track_at(rate: u32, seconds: f64, value: f32) -> AudioTrack {
    let frames = (seconds * rate as f64).round() as usize;
    AudioTrack::new(vec![value; frames * STEREO as usize], rate, STEREO)
}
