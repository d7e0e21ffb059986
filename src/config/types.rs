use hls_sink_playlist::LockScope;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub merge: MergeConfig,

    #[serde(default)]
    pub segments: SegmentConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request body in bytes (default: 150 MiB)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Request header carrying the origin URL of the artifact
    #[serde(default = "default_url_header")]
    pub url_header: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    12345
}
fn default_max_body_bytes() -> usize {
    150 * 1024 * 1024
}
fn default_url_header() -> String {
    "x-filename-url".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
            url_header: default_url_header(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Base directory under which `<host>/<path>` trees are created
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

fn default_root() -> PathBuf {
    PathBuf::from("./hls-data")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MergeConfig {
    /// `global` serializes every playlist merge; `per_file` only merges of
    /// the same playlist
    #[serde(default)]
    pub lock_scope: LockScope,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SegmentConfig {
    /// Compare SHA-256 of a resubmitted segment with the stored one and
    /// reject it with 409 when they differ
    #[serde(default)]
    pub verify_duplicates: bool,
}
