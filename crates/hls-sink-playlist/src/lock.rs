//! Mutual exclusion for playlist read-merge-append sequences.
//!
//! Waiters queue on a `tokio::sync::Mutex`, which wakes them in FIFO order;
//! nobody polls. The guard releases on drop, so every exit path of a merge,
//! including `?` on an I/O error, gives the lock back.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// How widely a playlist lock is shared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockScope {
    /// One lock for the whole process: merges into different files are
    /// serialized against each other too.
    #[default]
    Global,
    /// One lock per playlist path: only merges into the same file wait.
    PerFile,
}

/// Held for the duration of a critical section.
pub type PlaylistGuard = OwnedMutexGuard<()>;

/// Registry handing out playlist locks according to a [`LockScope`].
#[derive(Debug, Default)]
pub struct PlaylistLocks {
    scope: LockScope,
    global: Arc<Mutex<()>>,
    per_file: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl PlaylistLocks {
    /// Create a registry with the given scope.
    pub fn new(scope: LockScope) -> Self {
        Self {
            scope,
            global: Arc::new(Mutex::new(())),
            per_file: DashMap::new(),
        }
    }

    /// The scope this registry was built with.
    pub fn scope(&self) -> LockScope {
        self.scope
    }

    /// Wait for the lock covering `path`.
    pub async fn acquire(&self, path: &Path) -> PlaylistGuard {
        let mutex = match self.scope {
            LockScope::Global => Arc::clone(&self.global),
            LockScope::PerFile => Arc::clone(
                self.per_file
                    .entry(path.to_path_buf())
                    .or_insert_with(|| Arc::new(Mutex::new(())))
                    .value(),
            ),
        };

        if let Ok(guard) = Arc::clone(&mutex).try_lock_owned() {
            return guard;
        }
        tracing::debug!(path = %path.display(), "Waiting for playlist lock");
        mutex.lock_owned().await
    }

    /// Drop per-file locks nobody holds or waits for.
    pub fn prune_idle(&self) {
        self.per_file.retain(|_, mutex| Arc::strong_count(mutex) > 1);
    }

    /// Number of per-file locks currently tracked.
    pub fn tracked(&self) -> usize {
        self.per_file.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    async fn critical_sections(
        locks: Arc<PlaylistLocks>,
        paths: &[&str],
    ) -> Vec<(Instant, Instant)> {
        let mut handles = Vec::new();
        for path in paths {
            let locks = Arc::clone(&locks);
            let path = PathBuf::from(path);
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire(&path).await;
                let start = Instant::now();
                tokio::time::sleep(Duration::from_millis(30)).await;
                (start, Instant::now())
            }));
        }
        let mut spans = Vec::new();
        for handle in handles {
            spans.push(handle.await.unwrap());
        }
        spans.sort_by_key(|(start, _)| *start);
        spans
    }

    fn overlaps(spans: &[(Instant, Instant)]) -> bool {
        spans.windows(2).any(|w| w[1].0 < w[0].1)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_global_scope_serializes_different_files() {
        let locks = Arc::new(PlaylistLocks::new(LockScope::Global));
        let spans = critical_sections(locks, &["a/p.m3u8", "b/q.m3u8", "c/r.m3u8"]).await;
        assert!(!overlaps(&spans));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_per_file_scope_serializes_same_file() {
        let locks = Arc::new(PlaylistLocks::new(LockScope::PerFile));
        let spans = critical_sections(locks, &["a/p.m3u8", "a/p.m3u8", "a/p.m3u8"]).await;
        assert!(!overlaps(&spans));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_per_file_scope_runs_different_files_together() {
        let locks = Arc::new(PlaylistLocks::new(LockScope::PerFile));
        let spans = critical_sections(locks, &["a/p.m3u8", "b/q.m3u8"]).await;
        assert!(overlaps(&spans));
    }

    #[tokio::test]
    async fn test_guard_release_on_drop() {
        let locks = PlaylistLocks::new(LockScope::Global);
        let path = Path::new("x.m3u8");
        {
            let _guard = locks.acquire(path).await;
            assert!(Arc::clone(&locks.global).try_lock_owned().is_err());
        }
        assert!(Arc::clone(&locks.global).try_lock_owned().is_ok());
    }

    #[tokio::test]
    async fn test_prune_idle() {
        let locks = PlaylistLocks::new(LockScope::PerFile);
        let held = locks.acquire(Path::new("held.m3u8")).await;
        drop(locks.acquire(Path::new("idle.m3u8")).await);
        assert_eq!(locks.tracked(), 2);

        locks.prune_idle();
        assert_eq!(locks.tracked(), 1);
        assert!(locks.per_file.contains_key(Path::new("held.m3u8")));

        drop(held);
        locks.prune_idle();
        assert_eq!(locks.tracked(), 0);
    }
}
