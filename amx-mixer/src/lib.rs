//! # AMX Mixer Library (amx-mixer)
//!
//! On-demand affirmation track mixer.
//!
//! **Purpose:** Fetch a background track and N voice tracks, layer the
//! voices in a staggered repeating pattern over the background, encode the
//! mix as MP3 and publish it to object storage.
//!
//! **Architecture:** symphonia + rubato decode/resample, a pure synchronous
//! compositor, LAME encode, axum HTTP front end.

pub mod api;
pub mod audio;
pub mod config;
pub mod mixer;
pub mod pipeline;
pub mod publisher;
pub mod stager;

pub use amx_common::{Error, Result};
pub use pipeline::Pipeline;
