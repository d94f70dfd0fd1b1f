//! Common test utilities for endpoint testing with mocks.
//!
//! This module provides a test fixture that builds the router in-process
//! with mock storage, prober and encoder injected, so transcode requests run
//! end to end without ffmpeg or S3.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use ladder_core::{
    testing::{MockEncoder, MockProber, MockStorage},
    Config, Transcoder, TranscoderConfig,
};

/// Re-export fixtures for test convenience
pub use ladder_core::testing::fixtures;

/// Test fixture with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_transcode() {
///     let fixture = TestFixture::new().await;
///     fixture.storage.add_source("clip.mp4", fixtures::source_bytes()).await;
///
///     let response = fixture.transcode(&["clip.mp4"]).await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock storage - seed sources, inspect uploads
    pub storage: Arc<MockStorage>,
    /// Mock prober - control reported resolution
    pub prober: Arc<MockProber>,
    /// Mock encoder - inject encode failures
    pub encoder: Arc<MockEncoder>,
    /// Scratch root used by jobs
    pub scratch: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Create a fixture whose prober reports a 640x360 source.
    pub async fn new() -> Self {
        Self::with_dimensions(640, 360).await
    }

    /// Create a fixture whose prober reports the given source size.
    pub async fn with_dimensions(width: u32, height: u32) -> Self {
        let scratch = TempDir::new().expect("Failed to create scratch dir");

        let storage = Arc::new(MockStorage::new());
        let prober = Arc::new(MockProber::new(fixtures::metadata(width, height)));
        let encoder = Arc::new(MockEncoder::new());

        let transcoder = Transcoder::new(
            TranscoderConfig::default().with_scratch_dir(scratch.path()),
            storage.clone(),
            prober.clone(),
            encoder.clone(),
        );

        let state = Arc::new(ladder_server::state::AppState::new(
            Config::default(),
            Arc::new(transcoder),
        ));
        let router = ladder_server::api::create_router(state);

        Self {
            router,
            storage,
            prober,
            encoder,
            scratch,
        }
    }

    /// Number of entries left in the scratch root.
    pub fn scratch_entries(&self) -> usize {
        std::fs::read_dir(self.scratch.path())
            .map(|d| d.count())
            .unwrap_or(0)
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(Request::builder().method("GET").uri(path).body(Body::empty()).unwrap())
            .await
    }

    /// POST one `{"filename": ...}` message per key to the transcode endpoint.
    pub async fn transcode(&self, keys: &[&str]) -> TestResponse {
        let body: String = keys
            .iter()
            .map(|k| format!("{}\n", serde_json::json!({ "filename": k })))
            .collect();
        self.post_ndjson("/api/v1/transcode", body).await
    }

    /// POST a raw newline-delimited JSON body.
    pub async fn post_ndjson(&self, path: &str, body: impl Into<Body>) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/x-ndjson")
            .body(body.into())
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
