//! Byte-level file storage for media segments.
//!
//! Segments are write-once: the first stored copy wins and is never
//! overwritten. Bytes are staged in a hidden file next to the target and
//! published with a hard link, so a segment is only ever visible under its
//! real name with its full content.

use hls_sink_common::{Error, Result};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Outcome of [`write_once`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOnce {
    /// The file was created with the given bytes.
    Written,
    /// A file already existed at the path; nothing was written.
    AlreadyExists,
}

/// Check whether a file exists.
pub async fn exists(path: &Path) -> Result<bool> {
    Ok(tokio::fs::try_exists(path).await?)
}

/// Create `path` with `data`, unless it already exists.
///
/// Publishing is a single `link(2)`, which fails if the target exists, so of
/// two concurrent writers exactly one gets [`WriteOnce::Written`] and the
/// other never observes a partial file. The staging file is always removed.
pub async fn write_once(path: &Path, data: &[u8]) -> Result<WriteOnce> {
    let staging = staging_path(path)?;

    let published = async {
        stage(&staging, data).await?;
        match tokio::fs::hard_link(&staging, path).await {
            Ok(()) => Ok(WriteOnce::Written),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(WriteOnce::AlreadyExists),
            Err(e) => Err(e),
        }
    }
    .await;

    if let Err(e) = tokio::fs::remove_file(&staging).await {
        if e.kind() != ErrorKind::NotFound {
            tracing::warn!("Failed to remove staging file {:?}: {}", staging, e);
        }
    }

    Ok(published?)
}

fn staging_path(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::internal(format!("{:?} has no file name", path)))?;
    let staging = format!(
        ".{}.{}.part",
        file_name.to_string_lossy(),
        uuid::Uuid::new_v4()
    );
    Ok(path.with_file_name(staging))
}

async fn stage(staging: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(staging)
        .await?;
    file.write_all(data).await?;
    file.flush().await
}

/// Hex-encoded SHA-256 of a byte slice.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Hex-encoded SHA-256 of a file's content.
pub async fn sha256_file(path: &Path) -> Result<String> {
    let data = tokio::fs::read(path).await?;
    Ok(sha256_hex(&data))
}
