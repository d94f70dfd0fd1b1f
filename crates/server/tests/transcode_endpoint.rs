//! Transcode endpoint tests using the in-process router with mocks.

mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::StatusCode;
use bytes::Bytes;
use serde_json::json;

use common::{fixtures, TestFixture};
use ladder_core::{ProbeError, Rendition, StorageError};

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/health").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["storage"], "mock");
}

#[tokio::test]
async fn test_config_is_sanitized() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/config").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["server"]["port"], 50051);
    assert_eq!(response.body["storage"]["backend"], "s3");
    assert_eq!(response.body["encoder"]["crf"], 23);
}

#[tokio::test]
async fn test_transcode_360p_source() {
    let fixture = TestFixture::new().await;
    fixture
        .storage
        .add_source("clip.mp4", fixtures::source_bytes())
        .await;

    let response = fixture.transcode(&["clip.mp4"]).await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({
            "message": "Transcoded successfully",
            "success": true,
            "transcodedFiles": ["240p", "360p"],
            "durationMillis": 10000
        })
    );

    let keys = fixture.storage.object_keys().await;
    assert!(keys.contains(&"transcoded/clip/240p/index.m3u8".to_string()));
    assert!(keys.contains(&"transcoded/clip/360p/segment_000.ts".to_string()));
    assert_eq!(fixture.scratch_entries(), 0);
}

#[tokio::test]
async fn test_last_filename_wins() {
    let fixture = TestFixture::with_dimensions(426, 240).await;
    fixture
        .storage
        .add_source("second.mp4", fixtures::source_bytes())
        .await;

    let response = fixture.transcode(&["first.mp4", "second.mp4"]).await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["transcodedFiles"], json!(["240p"]));
    assert_eq!(fixture.storage.recorded_downloads().await, vec!["second.mp4"]);
}

#[tokio::test]
async fn test_streamed_body_in_chunks() {
    let fixture = TestFixture::with_dimensions(426, 240).await;
    fixture
        .storage
        .add_source("clip.mp4", fixtures::source_bytes())
        .await;

    let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
        Ok(Bytes::from_static(b"{\"filename\":")),
        Ok(Bytes::from_static(b"\"clip.mp4\"}")),
        Ok(Bytes::from_static(b"\n")),
    ];
    let body = Body::from_stream(futures::stream::iter(chunks));
    let response = fixture.post_ndjson("/api/v1/transcode", body).await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["success"], true);
}

#[tokio::test]
async fn test_stream_error_dispatches_no_job() {
    let fixture = TestFixture::new().await;
    fixture
        .storage
        .add_source("clip.mp4", fixtures::source_bytes())
        .await;

    let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
        Ok(Bytes::from_static(b"{\"filename\":\"clip.mp4\"}\n")),
        Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
    ];
    let body = Body::from_stream(futures::stream::iter(chunks));
    let response = fixture.post_ndjson("/api/v1/transcode", body).await;

    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
    assert!(response.body["message"]
        .as_str()
        .unwrap()
        .starts_with("request stream failed"));
    assert!(fixture.storage.recorded_downloads().await.is_empty());
}

#[tokio::test]
async fn test_empty_body_rejected() {
    let fixture = TestFixture::new().await;
    let response = fixture.post_ndjson("/api/v1/transcode", "").await;

    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body,
        json!({
            "message": "no filename received",
            "success": false,
            "transcodedFiles": [],
            "durationMillis": 0
        })
    );
    assert!(fixture.storage.recorded_downloads().await.is_empty());
}

#[tokio::test]
async fn test_blank_filename_rejected() {
    let fixture = TestFixture::new().await;
    let response = fixture.transcode(&[""]).await;

    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "filename is empty");
}

#[tokio::test]
async fn test_malformed_message_rejected() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .post_ndjson("/api/v1/transcode", "{\"filename\": 42}\n")
        .await;

    assert_status!(response, StatusCode::BAD_REQUEST);
    assert!(response.body["message"]
        .as_str()
        .unwrap()
        .starts_with("invalid message on line 1"));
}

#[tokio::test]
async fn test_missing_source_reports_download_stage() {
    let fixture = TestFixture::new().await;
    let response = fixture.transcode(&["missing.mp4"]).await;

    assert_status!(response, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["transcodedFiles"], json!([]));
    assert_eq!(response.body["durationMillis"], 0);
    assert_eq!(
        response.body["message"],
        "download failed: Object not found: missing.mp4"
    );
}

#[tokio::test]
async fn test_download_error_message() {
    let fixture = TestFixture::new().await;
    fixture
        .storage
        .set_next_download_error(StorageError::download_failed("clip.mp4", "access denied"))
        .await;

    let response = fixture.transcode(&["clip.mp4"]).await;

    assert_eq!(
        response.body["message"],
        "download failed: Failed to download clip.mp4: access denied"
    );
}

#[tokio::test]
async fn test_probe_failure_reports_probe_stage() {
    let fixture = TestFixture::new().await;
    fixture
        .storage
        .add_source("corrupt.mp4", fixtures::source_bytes())
        .await;
    fixture
        .prober
        .set_next_error(ProbeError::Failed {
            stderr: "corrupt.mp4: Invalid data found when processing input".to_string(),
        })
        .await;

    let response = fixture.transcode(&["corrupt.mp4"]).await;

    assert_status!(response, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["transcodedFiles"], json!([]));
    let message = response.body["message"].as_str().unwrap();
    assert!(message.starts_with("probe failed"), "{}", message);
    assert!(message.contains("Invalid data found"));
    assert!(fixture.encoder.recorded_encodes().await.is_empty());
    assert!(fixture.storage.recorded_uploads().await.is_empty());
    assert_eq!(fixture.scratch_entries(), 0);
}

#[tokio::test]
async fn test_encode_failure_reports_rendition() {
    let fixture = TestFixture::with_dimensions(1280, 720).await;
    fixture
        .storage
        .add_source("clip.mp4", fixtures::source_bytes())
        .await;
    fixture
        .encoder
        .fail_rendition(Rendition::P360, "Error while opening encoder")
        .await;

    let response = fixture.transcode(&["clip.mp4"]).await;

    assert_status!(response, StatusCode::INTERNAL_SERVER_ERROR);
    let message = response.body["message"].as_str().unwrap();
    assert!(
        message.starts_with("encode failed for 360p (completed before failure: 240p)"),
        "{}",
        message
    );
    assert!(message.contains("Error while opening encoder"));
    assert_eq!(response.body["transcodedFiles"], json!([]));

    // Rolled back
    assert!(fixture.storage.object_keys().await.is_empty());
    assert_eq!(fixture.scratch_entries(), 0);
}

#[tokio::test]
async fn test_upload_failure_reports_rendition() {
    let fixture = TestFixture::new().await;
    fixture
        .storage
        .add_source("clip.mp4", fixtures::source_bytes())
        .await;
    fixture.storage.fail_uploads_matching("/240p/").await;

    let response = fixture.transcode(&["clip.mp4"]).await;

    let message = response.body["message"].as_str().unwrap();
    assert!(message.starts_with("upload failed for 240p: "), "{}", message);
}

#[tokio::test]
async fn test_concurrent_requests_are_independent() {
    let fixture = TestFixture::new().await;
    fixture
        .storage
        .add_source("a.mp4", fixtures::source_bytes())
        .await;
    fixture
        .storage
        .add_source("b.mp4", fixtures::source_bytes())
        .await;
    fixture.encoder.set_delay(Duration::from_millis(20)).await;

    let (a, b) = tokio::join!(fixture.transcode(&["a.mp4"]), fixture.transcode(&["b.mp4"]));

    assert_eq!(a.body["success"], true);
    assert_eq!(b.body["success"], true);
    let keys = fixture.storage.object_keys().await;
    assert!(keys.iter().any(|k| k.starts_with("transcoded/a/")));
    assert!(keys.iter().any(|k| k.starts_with("transcoded/b/")));
    assert_eq!(fixture.scratch_entries(), 0);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new().await;
    fixture.transcode(&[""]).await;

    let response = fixture.get("/metrics").await;

    assert_status!(response, StatusCode::OK);
    assert!(response.text.contains("ladder_transcode_requests_total"));
    assert!(response.text.contains("ladder_http_requests_total"));
}
