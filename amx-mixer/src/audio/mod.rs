//! Audio decode/resample/encode boundary
//!
//! Everything below the compositor: turning staged files into
//! [`AudioTrack`]s at the pipeline rate, and turning the mixed track back
//! into an MP3 file.

pub mod decoder;
pub mod encoder;
pub mod resampler;
pub mod types;

pub use decoder::SimpleDecoder;
pub use encoder::Mp3Encoder;
pub use resampler::{Resampler, TARGET_SAMPLE_RATE};
pub use types::{AudioFrame, AudioTrack, STEREO};
