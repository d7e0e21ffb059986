//! Locked read, dedup, append of playlist files.
//!
//! The on-disk playlist only ever grows. Each merge reads the whole file,
//! extracts the segments it already lists, and appends the pairs of the
//! incoming text that are not among them. Read and append happen under the
//! same [`PlaylistLocks`] guard.
//!
//! The sequence is not transactional: a crash between read and append loses
//! that one update and leaves the file valid but stale.

use crate::lock::{LockScope, PlaylistLocks};
use crate::snapshot::PlaylistSnapshot;
use hls_sink_common::Result;
use std::path::Path;
use std::sync::Arc;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Result of one merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Segment pairs appended.
    pub appended: usize,
    /// Bytes appended to the file.
    pub bytes_written: usize,
}

impl MergeOutcome {
    /// Whether the file was left untouched.
    pub fn is_noop(&self) -> bool {
        self.appended == 0
    }
}

/// What [`MergeEngine::ingest`] did with a playlist payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistWrite {
    /// The file did not exist and was written verbatim.
    Created {
        /// Payload size.
        bytes: usize,
    },
    /// The file existed and was merged into.
    Merged(MergeOutcome),
}

/// Playlist merge engine.
///
/// Cheap to clone; clones share the same lock registry.
#[derive(Debug, Clone)]
pub struct MergeEngine {
    locks: Arc<PlaylistLocks>,
}

impl MergeEngine {
    /// Create an engine whose locks follow `scope`.
    pub fn new(scope: LockScope) -> Self {
        Self {
            locks: Arc::new(PlaylistLocks::new(scope)),
        }
    }

    /// The lock registry guarding merges.
    pub fn locks(&self) -> &PlaylistLocks {
        &self.locks
    }

    /// Append the segments of `incoming` that `path` does not list yet.
    ///
    /// `path` must already exist. Errors from reading or appending are
    /// returned after the lock has been released.
    pub async fn merge_append(&self, path: &Path, incoming: &str) -> Result<MergeOutcome> {
        let guard = self.locks.acquire(path).await;
        let result = append_new_entries(path, incoming).await;
        drop(guard);
        self.release_idle();
        result
    }

    /// Store a playlist payload: written verbatim when `path` is new,
    /// merged into the existing file otherwise.
    ///
    /// The existence check runs under the lock, so two first payloads for the
    /// same path cannot overwrite each other.
    pub async fn ingest(&self, path: &Path, payload: &[u8]) -> Result<PlaylistWrite> {
        let guard = self.locks.acquire(path).await;
        let result = create_or_merge(path, payload).await;
        drop(guard);
        self.release_idle();
        result
    }

    fn release_idle(&self) {
        if self.locks.scope() == LockScope::PerFile {
            self.locks.prune_idle();
        }
    }
}

async fn create_or_merge(path: &Path, payload: &[u8]) -> Result<PlaylistWrite> {
    if !tokio::fs::try_exists(path).await? {
        tokio::fs::write(path, payload).await?;
        tracing::info!(path = %path.display(), bytes = payload.len(), "Created playlist");
        return Ok(PlaylistWrite::Created {
            bytes: payload.len(),
        });
    }

    let incoming = String::from_utf8_lossy(payload);
    let outcome = append_new_entries(path, &incoming).await?;
    Ok(PlaylistWrite::Merged(outcome))
}

async fn append_new_entries(path: &Path, incoming: &str) -> Result<MergeOutcome> {
    let existing_bytes = tokio::fs::read(path).await?;
    let existing = PlaylistSnapshot::parse(&String::from_utf8_lossy(&existing_bytes));
    let fresh = PlaylistSnapshot::parse(incoming).without(&existing);

    let Some(block) = fresh.render() else {
        tracing::debug!(path = %path.display(), "No new segments to append");
        return Ok(MergeOutcome::default());
    };

    // Keep the last existing line from fusing with the first appended one.
    let mut out = String::with_capacity(block.len() + 1);
    if existing_bytes.last().is_some_and(|b| *b != b'\n') {
        out.push('\n');
    }
    out.push_str(&block);

    let mut file = OpenOptions::new().append(true).open(path).await?;
    file.write_all(out.as_bytes()).await?;
    file.flush().await?;

    tracing::info!(
        path = %path.display(),
        appended = fresh.len(),
        known = existing.len(),
        "Appended new segments to playlist"
    );

    Ok(MergeOutcome {
        appended: fresh.len(),
        bytes_written: out.len(),
    })
}
