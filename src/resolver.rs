//! Origin URL to storage location mapping.
//!
//! Playlists (and anything that is not a segment) mirror the URL path:
//! `https://cdn.example.com/live/720p/index.m3u8` lands in
//! `<root>/cdn.example.com/live/720p/index.m3u8`.
//!
//! Segments drop their immediate parent directory as well, so renditions of
//! one stream share a directory:
//! `https://cdn.example.com/live/720p/seg001.ts` lands in
//! `<root>/cdn.example.com/live/seg001.ts`. A segment with no parent
//! directory, or with only one, lands in the host directory.

use hls_sink_common::paths::{is_playlist_name, is_segment_name};
use hls_sink_common::{Error, Result};
use std::path::{Component, Path, PathBuf};
use url::Url;

/// Kind of artifact a file name denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// `.m3u8` media playlist.
    Playlist,
    /// `.ts` media segment.
    Segment,
    /// Anything else; stored like a segment.
    Other,
}

impl ArtifactKind {
    /// Classify a file name.
    pub fn of(file_name: &str) -> Self {
        if is_playlist_name(file_name) {
            Self::Playlist
        } else if is_segment_name(file_name) {
            Self::Segment
        } else {
            Self::Other
        }
    }
}

/// Where an artifact is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Directory holding the file.
    pub dir: PathBuf,
    /// File name, taken verbatim from the last URL path segment.
    pub file_name: String,
}

impl Target {
    /// Full path of the file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    /// Kind of the artifact, from its file name.
    pub fn kind(&self) -> ArtifactKind {
        ArtifactKind::of(&self.file_name)
    }
}

/// Map an origin URL to its storage location under `root`.
///
/// Pure computation; nothing is created on disk.
pub fn resolve(root: &Path, raw_url: &str) -> Result<Target> {
    let url = Url::parse(raw_url.trim())
        .map_err(|e| Error::invalid_url(format!("{}: {}", raw_url, e)))?;

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| Error::invalid_url(format!("{}: URL has no host", raw_url)))?;

    // The host becomes one directory under the root and nothing else.
    if !is_single_component(host) {
        return Err(Error::invalid_url(format!(
            "{}: host {:?} is not a usable directory name",
            raw_url, host
        )));
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.collect())
        .unwrap_or_default();

    let file_name = match segments.split_last() {
        Some((last, _)) if !last.is_empty() => *last,
        _ => {
            return Err(Error::invalid_url(format!(
                "{}: URL has no file name",
                raw_url
            )))
        }
    };

    let mut parents: Vec<&str> = segments[..segments.len() - 1]
        .iter()
        .copied()
        .filter(|s| !s.is_empty())
        .collect();

    if let Some(bad) = parents
        .iter()
        .chain(std::iter::once(&file_name))
        .find(|s| !is_single_component(s))
    {
        return Err(Error::invalid_url(format!(
            "{}: path segment {:?} is not a usable name",
            raw_url, bad
        )));
    }

    if is_segment_name(file_name) {
        // Collapse the rendition directory; shallow paths clamp to the host.
        parents.pop();
    }

    let mut dir = root.join(host);
    dir.extend(parents);

    Ok(Target {
        dir,
        file_name: file_name.to_string(),
    })
}

fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Resolve `raw_url` and make sure its directory exists.
pub async fn prepare(root: &Path, raw_url: &str) -> Result<Target> {
    let target = resolve(root, raw_url)?;
    tokio::fs::create_dir_all(&target.dir).await.map_err(|e| {
        tracing::error!("Failed to create directory {:?}: {}", target.dir, e);
        Error::from(e)
    })?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> PathBuf {
        PathBuf::from("/data")
    }

    #[test]
    fn test_playlist_mirrors_path() {
        let t = resolve(&root(), "https://cdn.example.com/live/720p/index.m3u8").unwrap();
        assert_eq!(t.dir, Path::new("/data/cdn.example.com/live/720p"));
        assert_eq!(t.file_name, "index.m3u8");
        assert_eq!(t.kind(), ArtifactKind::Playlist);
        assert_eq!(
            t.path(),
            Path::new("/data/cdn.example.com/live/720p/index.m3u8")
        );
    }

    #[test]
    fn test_segment_collapses_variant_dir() {
        let t = resolve(&root(), "https://cdn.example.com/live/720p/seg001.ts").unwrap();
        assert_eq!(t.dir, Path::new("/data/cdn.example.com/live"));
        assert_eq!(t.file_name, "seg001.ts");
        assert_eq!(t.kind(), ArtifactKind::Segment);

        let t = resolve(&root(), "https://cdn.example.com/a/b/c/1080p/seg.ts").unwrap();
        assert_eq!(t.dir, Path::new("/data/cdn.example.com/a/b/c"));
    }

    #[test]
    fn test_shallow_segment_clamps_to_host() {
        let t = resolve(&root(), "https://cdn.example.com/720p/seg001.ts").unwrap();
        assert_eq!(t.dir, Path::new("/data/cdn.example.com"));

        let t = resolve(&root(), "https://cdn.example.com/seg001.ts").unwrap();
        assert_eq!(t.dir, Path::new("/data/cdn.example.com"));
        assert_eq!(t.file_name, "seg001.ts");
    }

    #[test]
    fn test_query_and_port_ignored() {
        let t = resolve(
            &root(),
            "http://cdn.example.com:8080/live/hi/seg7.ts?token=abc",
        )
        .unwrap();
        assert_eq!(t.dir, Path::new("/data/cdn.example.com/live"));
        assert_eq!(t.file_name, "seg7.ts");
    }

    #[test]
    fn test_empty_segments_skipped() {
        let t = resolve(&root(), "https://h.example//live//index.m3u8").unwrap();
        assert_eq!(t.dir, Path::new("/data/h.example/live"));
    }

    #[test]
    fn test_dot_segments_normalized() {
        let t = resolve(&root(), "https://h.example/a/../../etc/index.m3u8").unwrap();
        assert_eq!(t.dir, Path::new("/data/h.example/etc"));
    }

    #[test]
    fn test_other_files_mirror_path() {
        let t = resolve(&root(), "https://h.example/live/720p/init.mp4").unwrap();
        assert_eq!(t.dir, Path::new("/data/h.example/live/720p"));
        assert_eq!(t.kind(), ArtifactKind::Other);
    }

    #[test]
    fn test_invalid_urls() {
        for raw in [
            "not a url",
            "/relative/seg.ts",
            "https://h.example/",
            "https://h.example",
            "https://h.example/live/",
            "file:///tmp/seg.ts",
            "data:text/plain,hello",
            "https://../x/y.m3u8",
            "https://%2e%2e/x/y.m3u8",
            "https://..:80/seg.ts",
            "https://./y.m3u8",
        ] {
            let err = resolve(&root(), raw).unwrap_err();
            assert!(matches!(err, Error::InvalidUrl(_)), "{raw}");
        }
    }

    #[tokio::test]
    async fn test_prepare_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let t = prepare(dir.path(), "https://h.example/live/720p/seg.ts")
            .await
            .unwrap();
        assert!(t.dir.is_dir());
        assert_eq!(t.dir, dir.path().join("h.example/live"));

        // Existing directories are fine.
        prepare(dir.path(), "https://h.example/live/480p/seg2.ts")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_prepare_propagates_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the host directory should be.
        std::fs::write(dir.path().join("h.example"), b"x").unwrap();
        let err = prepare(dir.path(), "https://h.example/live/index.m3u8")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
