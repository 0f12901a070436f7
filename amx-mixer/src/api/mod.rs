//! HTTP API for amx-mixer

pub mod handlers;
pub mod server;

pub use server::{create_router, AppContext};
