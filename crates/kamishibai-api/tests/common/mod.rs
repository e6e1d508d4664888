//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use kamishibai_core::clock::Clock;
use kamishibai_core::config::PlayerConfig;
use kamishibai_scenario::application::loader::FsScenarioSource;
use kamishibai_test_support::FixedClock;
use tower::ServiceExt;

use kamishibai_api::state::AppState;

/// A throwaway packs root under the system temp directory.
pub struct TempPacks {
    pub root: PathBuf,
}

impl TempPacks {
    pub fn new() -> Self {
        let root = std::env::temp_dir().join(format!("kamishibai-api-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&root).unwrap();
        Self { root }
    }

    /// Writes `contents` to `<root>/<relative>`, creating directories.
    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    pub fn path(&self) -> &Path {
        &self.root
    }
}

impl Drop for TempPacks {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

/// Build the full app router over a filesystem packs root with a fixed
/// clock. Uses the same router as `main.rs`.
pub fn build_test_app(packs: &TempPacks, scenario: &str) -> Router {
    let clock: Arc<dyn Clock> = Arc::new(FixedClock::epoch());
    let config = PlayerConfig {
        packs_root: packs.path().to_string_lossy().into_owned(),
        scenario: scenario.to_owned(),
        ..PlayerConfig::default()
    };
    let app_state = AppState::new(config, clock, Arc::new(FsScenarioSource));
    kamishibai_api::app(app_state)
}

/// Send a request and return the status and raw body.
pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<&serde_json::Value>,
) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, body_bytes.to_vec())
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let (status, bytes) = send(app, "POST", uri, Some(body)).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Send a bodiless POST request and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, bytes) = send(app, "POST", uri, None).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, bytes) = send(app, "GET", uri, None).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}
