//! # AMX Common Library
//!
//! Shared code for the AMX (Affirmation Mixer) service including:
//! - Error taxonomy and stable error kinds
//! - API request/response types
//! - Configuration loading
//! - Identifier utilities

pub mod api;
pub mod config;
pub mod error;
pub mod uuid_utils;

pub use error::{Error, ErrorKind, Result};
