//! Hls-Sink-Common: shared types and utilities.
//!
//! This crate provides functionality used by both the playlist engine and the
//! ingest server:
//!
//! - **Error Handling**: a common error type with HTTP status mapping
//! - **File Kinds**: helpers deciding whether a name or line denotes a
//!   playlist or a media segment
//!
//! # Examples
//!
//! ```
//! use hls_sink_common::{Error, Result};
//! use hls_sink_common::paths::{is_playlist_name, is_segment_uri_line};
//!
//! assert!(is_playlist_name("index.m3u8"));
//! assert!(is_segment_uri_line("seg001.ts?token=abc"));
//!
//! fn example() -> Result<()> {
//!     Err(Error::invalid_url("no host"))
//! }
//! assert_eq!(example().unwrap_err().http_status(), 400);
//! ```

pub mod error;
pub mod paths;

pub use error::{Error, Result};
