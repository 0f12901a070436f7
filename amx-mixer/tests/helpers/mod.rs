//! Shared helpers for amx-mixer integration tests

#![allow(dead_code)]

pub mod asset_server;
pub mod audio_generator;
