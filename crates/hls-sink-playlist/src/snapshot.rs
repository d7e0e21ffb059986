//! Segment extraction from playlist text.
//!
//! A segment is recognized only as an adjacent pair of lines: an `#EXTINF`
//! directive immediately followed by a URI ending in `.ts` (query string
//! allowed). Anything else, including a URI whose previous line is a comment
//! or another tag, is ignored.

use hls_sink_common::paths::is_segment_uri_line;
use indexmap::IndexMap;

const EXTINF_TAG: &str = "#EXTINF:";

/// Check if a (trimmed) line is an `#EXTINF:<duration>,<title>` directive.
///
/// The duration must be a non-empty run of digits, `.` and `-`, optionally
/// preceded by whitespace, and must be followed by a comma.
///
/// # Examples
///
/// ```
/// use hls_sink_playlist::is_extinf_line;
///
/// assert!(is_extinf_line("#EXTINF:10,"));
/// assert!(is_extinf_line("#EXTINF: -1.5,live title"));
/// assert!(!is_extinf_line("#EXTINF:10"));
/// assert!(!is_extinf_line("#EXT-X-TARGETDURATION:10"));
/// ```
pub fn is_extinf_line(line: &str) -> bool {
    let Some(rest) = line.strip_prefix(EXTINF_TAG) else {
        return false;
    };
    let rest = rest.trim_start();
    let duration_len = rest
        .bytes()
        .take_while(|b| b.is_ascii_digit() || *b == b'.' || *b == b'-')
        .count();
    duration_len > 0 && rest.as_bytes().get(duration_len) == Some(&b',')
}

/// One recognized metadata/URI pair, borrowed from the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentEntry<'a> {
    /// The trimmed `#EXTINF` line.
    pub metadata: &'a str,
    /// The trimmed URI line; the deduplication key.
    pub uri: &'a str,
}

/// Iterator over the segment pairs of a playlist text, top to bottom.
///
/// Looks back exactly one line: a URI line counts only if the line right
/// before it is an `#EXTINF` directive.
pub struct SegmentScanner<'a> {
    lines: std::str::Split<'a, char>,
    previous: Option<&'a str>,
}

impl<'a> SegmentScanner<'a> {
    /// Start scanning `text`.
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.split('\n'),
            previous: None,
        }
    }
}

impl<'a> Iterator for SegmentScanner<'a> {
    type Item = SegmentEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        for raw in self.lines.by_ref() {
            let line = raw.trim();
            let previous = self.previous.replace(line);

            if !is_segment_uri_line(line) {
                continue;
            }
            if let Some(metadata) = previous.filter(|p| is_extinf_line(p)) {
                return Some(SegmentEntry {
                    metadata,
                    uri: line,
                });
            }
        }
        None
    }
}

/// Ordered mapping from segment URI to its `#EXTINF` line.
///
/// Iteration follows first occurrence. When a URI shows up again later in the
/// same text it keeps its original position but takes the newer metadata line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistSnapshot {
    entries: IndexMap<String, String>,
}

impl PlaylistSnapshot {
    /// Build a snapshot from playlist text.
    pub fn parse(text: &str) -> Self {
        let mut entries = IndexMap::new();
        for entry in SegmentScanner::new(text) {
            entries.insert(entry.uri.to_string(), entry.metadata.to_string());
        }
        Self { entries }
    }

    /// Number of distinct segments.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no segment was recognized.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the snapshot holds `uri`.
    pub fn contains(&self, uri: &str) -> bool {
        self.entries.contains_key(uri)
    }

    /// Metadata line recorded for `uri`.
    pub fn metadata(&self, uri: &str) -> Option<&str> {
        self.entries.get(uri).map(String::as_str)
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = SegmentEntry<'_>> {
        self.entries.iter().map(|(uri, metadata)| SegmentEntry {
            metadata: metadata.as_str(),
            uri: uri.as_str(),
        })
    }

    /// The entries of `self` whose URI is absent from `known`, order kept.
    pub fn without(&self, known: &PlaylistSnapshot) -> PlaylistSnapshot {
        let entries = self
            .entries
            .iter()
            .filter(|(uri, _)| !known.contains(uri))
            .map(|(uri, metadata)| (uri.clone(), metadata.clone()))
            .collect();
        Self { entries }
    }

    /// Serialize as `metadata\nuri` pairs joined by `\n`, plus one trailing
    /// newline. `None` when there is nothing to write.
    pub fn render(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let mut out = String::new();
        for entry in self.iter() {
            out.push_str(entry.metadata);
            out.push('\n');
            out.push_str(entry.uri);
            out.push('\n');
        }
        Some(out)
    }
}
