//! Helpers for telling playlists from media segments.
//!
//! Matching is case-sensitive and purely lexical: a name is a playlist if it
//! ends in `.m3u8`, a segment if it ends in `.ts`.

/// Extension (with dot) of HLS media playlists.
pub const PLAYLIST_EXTENSION: &str = ".m3u8";

/// Extension (with dot) of MPEG-TS media segments.
pub const SEGMENT_EXTENSION: &str = ".ts";

/// Check if a file name denotes an HLS playlist.
///
/// # Examples
///
/// ```
/// use hls_sink_common::paths::is_playlist_name;
///
/// assert!(is_playlist_name("index.m3u8"));
/// assert!(!is_playlist_name("seg001.ts"));
/// ```
pub fn is_playlist_name(name: &str) -> bool {
    name.ends_with(PLAYLIST_EXTENSION)
}

/// Check if a file name denotes a media segment.
///
/// # Examples
///
/// ```
/// use hls_sink_common::paths::is_segment_name;
///
/// assert!(is_segment_name("seg001.ts"));
/// assert!(!is_segment_name("index.m3u8"));
/// ```
pub fn is_segment_name(name: &str) -> bool {
    name.ends_with(SEGMENT_EXTENSION)
}

/// Check if a playlist line is a segment URI.
///
/// The line must end in `.ts`, optionally followed by a query string
/// (`seg.ts?token=..`). Callers pass the line already trimmed.
pub fn is_segment_uri_line(line: &str) -> bool {
    if line.ends_with(SEGMENT_EXTENSION) {
        return true;
    }
    let with_query = [SEGMENT_EXTENSION, "?"].concat();
    line.contains(&with_query)
}
