//! Stagger layout
//!
//! Places every repetition of every voice on the output timeline. The
//! voice sequence is played `loop_count` times back to back, and each
//! placed instance starts `delay_increment` seconds after the previous one
//! regardless of how long the voices actually are.

use crate::audio::types::AudioTrack;

/// Number of passes over the voice list
pub const DEFAULT_LOOP_COUNT: u32 = 7;

/// Seconds between the starts of consecutive placed voices
pub const DEFAULT_DELAY_INCREMENT: f64 = 2.5;

/// Background music amplitude relative to its source
pub const DEFAULT_BACKGROUND_GAIN: f32 = 0.4;

/// Voice amplitude relative to its source
pub const DEFAULT_VOICE_GAIN: f32 = 1.0;

/// Longest output the compositor will lay out, in seconds
pub const MAX_TIMELINE_SECS: f64 = 4.0 * 60.0 * 60.0;

/// How the background covers an output longer than itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundExtension {
    /// Play the background once, then silence
    #[default]
    PadSilence,
    /// Repeat the background from its start until the output ends
    Loop,
}

/// What to do when the summed signal leaves [-1.0, 1.0]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Hard-clip each sample independently
    #[default]
    Clamp,
    /// Scale the whole mix so its peak lands at 1.0 (only if it overflows)
    PeakNormalize,
}

/// Layering parameters for one mix
#[derive(Debug, Clone, PartialEq)]
pub struct LayeringConfig {
    pub loop_count: u32,
    pub delay_increment: f64,
    pub background_gain: f32,
    pub voice_gain: f32,
    pub background_extension: BackgroundExtension,
    pub overflow: OverflowPolicy,
}

impl Default for LayeringConfig {
    fn default() -> Self {
        Self {
            loop_count: DEFAULT_LOOP_COUNT,
            delay_increment: DEFAULT_DELAY_INCREMENT,
            background_gain: DEFAULT_BACKGROUND_GAIN,
            voice_gain: DEFAULT_VOICE_GAIN,
            background_extension: BackgroundExtension::default(),
            overflow: OverflowPolicy::default(),
        }
    }
}

/// A voice track bound to a start offset on the output timeline
#[derive(Debug, Clone, Copy)]
pub struct PlacedTrack<'a> {
    pub track: &'a AudioTrack,
    /// Seconds from the start of the output
    pub start_offset: f64,
    pub loop_index: u32,
    pub voice_index: usize,
}

impl PlacedTrack<'_> {
    /// Seconds at which this instance stops sounding
    pub fn end_time(&self) -> f64 {
        self.start_offset + self.track.duration_secs()
    }

    /// First output frame this instance occupies
    pub fn start_frame(&self, sample_rate: u32) -> usize {
        (self.start_offset * sample_rate as f64).round() as usize
    }

    /// Owned description of this placement
    pub fn summary(&self) -> Placement {
        Placement {
            loop_index: self.loop_index,
            voice_index: self.voice_index,
            start_offset: self.start_offset,
            end_time: self.end_time(),
        }
    }
}

/// Owned record of where one voice instance landed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub loop_index: u32,
    pub voice_index: usize,
    pub start_offset: f64,
    pub end_time: f64,
}

/// Flatten `loop_count` passes over `voices` into placed instances.
///
/// Instance `p = loop * voices.len() + voice` starts at
/// `p * delay_increment`. The voice index is the inner loop, so the order
/// is v0, v1, .., vN, v0, v1, .. and the offsets form an arithmetic
/// progression starting at zero. Instances are never deduplicated.
pub fn layout(voices: &[AudioTrack], loop_count: u32, delay_increment: f64) -> Vec<PlacedTrack<'_>> {
    let per_loop = voices.len();
    let mut placed = Vec::with_capacity(per_loop * loop_count as usize);

    for loop_index in 0..loop_count {
        for (voice_index, track) in voices.iter().enumerate() {
            let position = loop_index as usize * per_loop + voice_index;
            placed.push(PlacedTrack {
                track,
                start_offset: position as f64 * delay_increment,
                loop_index,
                voice_index,
            });
        }
    }

    placed
}

/// Output length in seconds: the latest end time across the background
/// (placed at zero) and every voice instance.
pub fn total_duration(background: &AudioTrack, placed: &[PlacedTrack<'_>]) -> f64 {
    placed
        .iter()
        .map(PlacedTrack::end_time)
        .fold(background.duration_secs(), f64::max)
}
