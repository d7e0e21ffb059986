//! Hls-Sink-Playlist: incremental, duplicate-free playlist growth.
//!
//! A forwarder keeps posting fresh snapshots of a live media playlist. Each
//! snapshot overlaps the previous ones; this crate grows one on-disk file from
//! them without ever writing a segment twice.
//!
//! - [`snapshot`]: the `#EXTINF` / URI line-pair scanner and the ordered
//!   [`PlaylistSnapshot`] built from it
//! - [`lock`]: [`PlaylistLocks`], serializing read-merge-append sequences
//! - [`merge`]: [`MergeEngine`], the locked read, dedup, append operation
//!
//! # Example
//!
//! ```
//! use hls_sink_playlist::PlaylistSnapshot;
//!
//! let existing = PlaylistSnapshot::parse("#EXTINF:10,\nseg1.ts\n");
//! let incoming = PlaylistSnapshot::parse("#EXTINF:10,\nseg1.ts\n#EXTINF:9.5,\nseg2.ts\n");
//!
//! let fresh = incoming.without(&existing);
//! assert_eq!(fresh.render().as_deref(), Some("#EXTINF:9.5,\nseg2.ts\n"));
//! ```

pub mod lock;
pub mod merge;
pub mod snapshot;

pub use lock::{LockScope, PlaylistGuard, PlaylistLocks};
pub use merge::{MergeEngine, MergeOutcome, PlaylistWrite};
pub use snapshot::{is_extinf_line, PlaylistSnapshot, SegmentEntry, SegmentScanner};
