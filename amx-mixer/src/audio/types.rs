//! Core audio data types
//!
//! **Format:**
//! - Samples are f32 (floating point -1.0 to 1.0)
//! - Stereo interleaved: [L, R, L, R, ...]
//! - Sample rate is 44100 Hz once a track has been staged

/// Channel count of every staged track
pub const STEREO: u16 = 2;

/// AudioTrack holds one decoded signal for the duration of a single mix.
///
/// Gain is carried alongside the samples rather than baked in, so the
/// compositor applies it exactly once during superposition.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioTrack {
    /// PCM audio samples (interleaved)
    pub samples: Vec<f32>,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Channel count (2 after staging)
    pub channels: u16,

    /// Linear amplitude multiplier applied at mix time
    pub gain: f32,
}

impl AudioTrack {
    /// Create a track at unity gain
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
            gain: 1.0,
        }
    }

    /// Stereo track of `frames` frames of silence
    pub fn silent(frames: usize, sample_rate: u32) -> Self {
        Self::new(vec![0.0; frames * STEREO as usize], sample_rate, STEREO)
    }

    /// Same track with a different gain
    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = gain;
        self
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    /// Stereo frame at `frame_index`, if in range
    ///
    /// Mono tracks report the same value on both sides.
    pub fn frame(&self, frame_index: usize) -> Option<AudioFrame> {
        let channels = self.channels as usize;
        if channels == 0 || frame_index >= self.frames() {
            return None;
        }
        let base = frame_index * channels;
        let left = self.samples[base];
        let right = if channels > 1 { self.samples[base + 1] } else { left };
        Some(AudioFrame { left, right })
    }

    /// Largest absolute sample value
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
    }
}

/// AudioFrame represents a single stereo sample (one frame of audio).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioFrame {
    /// Left channel sample
    pub left: f32,

    /// Right channel sample
    pub right: f32,
}
