//! Audio compositor
//!
//! Layers N voice tracks over one background track: the voice sequence is
//! repeated `loop_count` times with a fixed stagger between instance
//! starts, the background is stretched to cover the result, and everything
//! is summed sample by sample after gain scaling.
//!
//! Policies where the layering pattern is silent:
//! - The background counts as a track placed at zero, so the output is
//!   never shorter than the background.
//! - Past its own end the background is silent ([`BackgroundExtension::PadSilence`]).
//! - Overflow is hard-clipped ([`OverflowPolicy::Clamp`]).
//! - An empty voice list yields the gain-scaled background alone.
//! - Layouts longer than [`MAX_TIMELINE_SECS`] are rejected before any
//!   buffer is allocated.

pub mod compose;
pub mod layout;

pub use compose::{compose, MixRequest, MixResult};
pub use layout::{
    layout, total_duration, BackgroundExtension, LayeringConfig, OverflowPolicy, Placement,
    PlacedTrack, MAX_TIMELINE_SECS,
};
