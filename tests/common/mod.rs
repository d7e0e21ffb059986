//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates a temporary storage root, a config
//! pointing at it and the full [`AppContext`]. Requests go through the router
//! with `tower::ServiceExt::oneshot`, no socket involved.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use hls_sink::config::Config;
use hls_sink::server::{create_router, AppContext};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tower::ServiceExt;

pub const URL_HEADER: &str = "x-filename-url";

/// Test harness wrapping an [`AppContext`] backed by a temporary directory.
pub struct TestHarness {
    pub ctx: AppContext,
    pub dir: TempDir,
}

impl TestHarness {
    /// Create a new harness with default configuration.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a new harness, letting the caller adjust the config first.
    pub fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let mut config = Config::default();
        config.storage.root = dir.path().to_path_buf();
        adjust(&mut config);

        let ctx = AppContext::new(config).expect("failed to build context");
        Self { ctx, dir }
    }

    pub fn router(&self) -> Router {
        create_router(self.ctx.clone())
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn stored(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// POST `body` to `/save` with the origin URL header set.
    pub async fn save(&self, url: &str, body: impl Into<Body>) -> (StatusCode, String) {
        let request = Request::post("/save")
            .header(URL_HEADER, url)
            .body(body.into())
            .unwrap();
        self.send(request).await
    }

    /// POST `body` to `/save` without any origin URL.
    pub async fn save_without_url(&self, body: impl Into<Body>) -> (StatusCode, String) {
        let request = Request::post("/save").body(body.into()).unwrap();
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let body = body_to_string(response.into_body()).await;
        (status, body)
    }

    /// Every file and directory under the storage root, sorted.
    pub fn tree(&self) -> Vec<PathBuf> {
        fn walk(dir: &Path, out: &mut Vec<PathBuf>) {
            for entry in std::fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                out.push(path.clone());
                if path.is_dir() {
                    walk(&path, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(self.root(), &mut out);
        out.sort();
        out
    }
}

/// Helper to get response body as string
pub async fn body_to_string(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn sha256_of(path: &Path) -> String {
    hex::encode(Sha256::digest(std::fs::read(path).unwrap()))
}
