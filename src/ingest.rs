//! Request-level ingest logic, independent of HTTP framing.
//!
//! One call stores at most one file:
//!
//! - no origin URL: accepted and ignored
//! - playlist: created verbatim, or merged through [`MergeEngine`]
//! - anything else: stored once; later copies are skipped
//!
//! The existence check and the write of a segment are not one atomic step.
//! Two requests for the same new segment may both pass the check; the
//! no-clobber publish in [`store::write_once`] then lets exactly one of them
//! store its bytes and the other reports a skip. A segment only appears once
//! fully written, so `verify_duplicates` always hashes a complete copy.
//! Content is assumed identical across duplicates unless that flag is on.

use crate::resolver::{self, ArtifactKind, Target};
use crate::store::{self, WriteOnce};
use hls_sink_common::{Error, Result};
use hls_sink_playlist::{LockScope, MergeEngine, PlaylistWrite};
use std::path::{Path, PathBuf};

/// What happened to an ingested artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// No origin URL was supplied; nothing was touched.
    Ignored,
    /// The artifact was written (or merged, for playlists).
    Saved {
        /// Stored file name.
        file_name: String,
    },
    /// A segment with the same name was already stored.
    Skipped {
        /// Stored file name.
        file_name: String,
    },
}

impl IngestOutcome {
    /// Human-readable status line for the response body.
    pub fn message(&self) -> String {
        match self {
            Self::Ignored => String::new(),
            Self::Saved { file_name } => format!("File saved successfully: {}", file_name),
            Self::Skipped { file_name } => {
                format!("File already exists, skipping: {}", file_name)
            }
        }
    }
}

/// Stores forwarded artifacts under a root directory.
#[derive(Debug, Clone)]
pub struct Ingestor {
    root: PathBuf,
    engine: MergeEngine,
    verify_duplicates: bool,
}

impl Ingestor {
    /// Create an ingestor writing under `root`.
    pub fn new(root: impl Into<PathBuf>, lock_scope: LockScope) -> Self {
        Self {
            root: root.into(),
            engine: MergeEngine::new(lock_scope),
            verify_duplicates: false,
        }
    }

    /// Compare resubmitted segments against the stored copy.
    pub fn with_duplicate_verification(mut self, enabled: bool) -> Self {
        self.verify_duplicates = enabled;
        self
    }

    /// Storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The playlist merge engine.
    pub fn engine(&self) -> &MergeEngine {
        &self.engine
    }

    /// Store `body` at the location derived from `origin_url`.
    pub async fn ingest(&self, origin_url: Option<&str>, body: &[u8]) -> Result<IngestOutcome> {
        let Some(url) = origin_url.map(str::trim).filter(|u| !u.is_empty()) else {
            tracing::debug!("No origin URL supplied, ignoring payload");
            return Ok(IngestOutcome::Ignored);
        };

        let target = resolver::prepare(&self.root, url).await?;

        match target.kind() {
            ArtifactKind::Playlist => self.store_playlist(&target, body).await,
            ArtifactKind::Segment | ArtifactKind::Other => self.store_segment(&target, body).await,
        }
    }

    async fn store_playlist(&self, target: &Target, body: &[u8]) -> Result<IngestOutcome> {
        let path = target.path();
        match self.engine.ingest(&path, body).await? {
            PlaylistWrite::Created { .. } => {
                tracing::info!("New playlist: {:?}", path);
            }
            PlaylistWrite::Merged(outcome) => {
                tracing::debug!(
                    "Merged playlist {:?}: {} new segments",
                    path,
                    outcome.appended
                );
            }
        }
        Ok(IngestOutcome::Saved {
            file_name: target.file_name.clone(),
        })
    }

    async fn store_segment(&self, target: &Target, body: &[u8]) -> Result<IngestOutcome> {
        let path = target.path();

        if store::exists(&path).await? {
            return self.skip_existing(target, &path, body).await;
        }

        match store::write_once(&path, body).await? {
            WriteOnce::Written => {
                tracing::info!("File saved successfully: {:?} ({} bytes)", path, body.len());
                Ok(IngestOutcome::Saved {
                    file_name: target.file_name.clone(),
                })
            }
            WriteOnce::AlreadyExists => self.skip_existing(target, &path, body).await,
        }
    }

    async fn skip_existing(
        &self,
        target: &Target,
        path: &Path,
        body: &[u8],
    ) -> Result<IngestOutcome> {
        if self.verify_duplicates {
            let stored = store::sha256_file(path).await?;
            let submitted = store::sha256_hex(body);
            if stored != submitted {
                tracing::warn!(
                    "Stored segment {:?} differs from resubmitted copy (stored {}, got {})",
                    path,
                    stored,
                    submitted
                );
                return Err(Error::conflict(format!(
                    "{} already stored with different content",
                    target.file_name
                )));
            }
        }

        tracing::debug!("File already exists, skipping: {:?}", path);
        Ok(IngestOutcome::Skipped {
            file_name: target.file_name.clone(),
        })
    }
}
