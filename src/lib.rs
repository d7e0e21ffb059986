//! Hls-sink - passive HLS ingest endpoint
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod ingest;
pub mod resolver;
pub mod server;
pub mod store;
