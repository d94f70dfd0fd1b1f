//! Transcode endpoint.
//!
//! `POST /api/v1/transcode` takes a streamed body of newline-delimited JSON
//! messages, each `{"filename": "<source key>"}`. Only the last key counts.
//! When the body ends cleanly one job runs and one JSON response is returned.

use axum::{
    body::Body,
    extract::State,
    http::StatusCode,
    Json,
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use ladder_core::TranscodeResult;

use crate::metrics::TRANSCODE_REQUESTS_TOTAL;
use crate::state::AppState;

/// Longest accepted message line in bytes.
pub const MAX_MESSAGE_BYTES: usize = 64 * 1024;

/// One request message.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscodeRequest {
    pub filename: String,
}

/// The single reply to a transcode request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscodeResponse {
    pub message: String,
    pub success: bool,
    pub transcoded_files: Vec<String>,
    pub duration_millis: i64,
}

impl TranscodeResponse {
    pub fn completed(result: &TranscodeResult) -> Self {
        Self {
            message: "Transcoded successfully".to_string(),
            success: true,
            transcoded_files: result.rendition_names(),
            duration_millis: i64::try_from(result.source_duration_millis).unwrap_or(i64::MAX),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
            transcoded_files: Vec::new(),
            duration_millis: 0,
        }
    }
}

/// Reasons a request is rejected before any job runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntakeError {
    #[error("request stream failed: {0}")]
    Transport(String),

    #[error("invalid message on line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("no filename received")]
    Empty,

    #[error("filename is empty")]
    BlankKey,
}

#[derive(Debug)]
enum IntakeState {
    AwaitingInput,
    Receiving { last_key: String },
}

/// Accumulates body chunks into messages, keeping only the last key.
#[derive(Debug)]
pub struct RequestIntake {
    state: IntakeState,
    pending: Vec<u8>,
    line: usize,
}

impl Default for RequestIntake {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestIntake {
    pub fn new() -> Self {
        Self {
            state: IntakeState::AwaitingInput,
            pending: Vec::new(),
            line: 0,
        }
    }

    /// Feeds one body chunk. Complete lines are parsed immediately.
    pub fn push(&mut self, chunk: &[u8]) -> Result<(), IntakeError> {
        self.pending.extend_from_slice(chunk);

        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            self.check_length(pos)?;
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.accept_line(&line[..line.len() - 1])?;
        }

        self.check_length(self.pending.len())
    }

    fn check_length(&self, len: usize) -> Result<(), IntakeError> {
        if len > MAX_MESSAGE_BYTES {
            return Err(IntakeError::Malformed {
                line: self.line + 1,
                reason: format!("message exceeds {} bytes", MAX_MESSAGE_BYTES),
            });
        }
        Ok(())
    }

    /// Ends the stream and yields the key to transcode.
    pub fn finish(mut self) -> Result<String, IntakeError> {
        let rest = std::mem::take(&mut self.pending);
        self.accept_line(&rest)?;

        match self.state {
            IntakeState::AwaitingInput => Err(IntakeError::Empty),
            IntakeState::Receiving { last_key } if last_key.trim().is_empty() => {
                Err(IntakeError::BlankKey)
            }
            IntakeState::Receiving { last_key } => Ok(last_key),
        }
    }

    fn accept_line(&mut self, raw: &[u8]) -> Result<(), IntakeError> {
        self.line += 1;
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }

        let message: TranscodeRequest =
            serde_json::from_slice(raw).map_err(|e| IntakeError::Malformed {
                line: self.line,
                reason: e.to_string(),
            })?;
        info!("Received video key {}", message.filename);

        self.state = IntakeState::Receiving {
            last_key: message.filename,
        };
        Ok(())
    }
}

/// Reads the whole request stream.
async fn read_request(body: Body) -> Result<String, IntakeError> {
    let mut intake = RequestIntake::new();
    let mut stream = body.into_data_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| IntakeError::Transport(e.to_string()))?;
        intake.push(&chunk)?;
    }

    intake.finish()
}

pub async fn transcode(
    State(state): State<Arc<AppState>>,
    body: Body,
) -> (StatusCode, Json<TranscodeResponse>) {
    let source_key = match read_request(body).await {
        Ok(key) => key,
        Err(e) => {
            warn!("Rejected transcode request: {}", e);
            TRANSCODE_REQUESTS_TOTAL.with_label_values(&["rejected"]).inc();
            return (
                StatusCode::BAD_REQUEST,
                Json(TranscodeResponse::failed(e.to_string())),
            );
        }
    };

    match state.transcoder().run(&source_key).await {
        Ok(result) => {
            info!("Transcoded files: {:?}", result.rendition_names());
            TRANSCODE_REQUESTS_TOTAL.with_label_values(&["success"]).inc();
            (StatusCode::OK, Json(TranscodeResponse::completed(&result)))
        }
        Err(e) => {
            TRANSCODE_REQUESTS_TOTAL.with_label_values(&["failed"]).inc();
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(TranscodeResponse::failed(e.to_string())),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intake(chunks: &[&str]) -> Result<String, IntakeError> {
        let mut intake = RequestIntake::new();
        for chunk in chunks {
            intake.push(chunk.as_bytes())?;
        }
        intake.finish()
    }

    #[test]
    fn test_single_message() {
        assert_eq!(intake(&["{\"filename\":\"clip.mp4\"}\n"]).unwrap(), "clip.mp4");
    }

    #[test]
    fn test_last_key_wins() {
        let key = intake(&[
            "{\"filename\":\"a.mp4\"}\n",
            "{\"filename\":\"b.mp4\"}\n{\"filename\":\"c.mp4\"}",
        ])
        .unwrap();
        assert_eq!(key, "c.mp4");
    }

    #[test]
    fn test_message_split_across_chunks() {
        let key = intake(&["{\"file", "name\":\"movies/clip", ".mp4\"}\r\n"]).unwrap();
        assert_eq!(key, "movies/clip.mp4");
    }

    #[test]
    fn test_blank_lines_ignored() {
        let key = intake(&["\n\n{\"filename\":\"clip.mp4\"}\n\n"]).unwrap();
        assert_eq!(key, "clip.mp4");
    }

    #[test]
    fn test_empty_stream_rejected() {
        assert_eq!(intake(&[]).unwrap_err(), IntakeError::Empty);
        assert_eq!(intake(&["\n \n"]).unwrap_err(), IntakeError::Empty);
    }

    #[test]
    fn test_blank_last_key_rejected() {
        let err = intake(&["{\"filename\":\"clip.mp4\"}\n{\"filename\":\"  \"}\n"]).unwrap_err();
        assert_eq!(err, IntakeError::BlankKey);
    }

    #[test]
    fn test_malformed_line_rejected() {
        let err = intake(&["{\"filename\":\"clip.mp4\"}\nnot json\n"]).unwrap_err();
        assert!(matches!(err, IntakeError::Malformed { line: 2, .. }));

        let err = intake(&["{\"name\":\"clip.mp4\"}"]).unwrap_err();
        assert!(matches!(err, IntakeError::Malformed { line: 1, .. }));
    }

    #[test]
    fn test_oversized_message_rejected() {
        let mut intake = RequestIntake::new();
        let big = vec![b'a'; MAX_MESSAGE_BYTES + 1];
        let err = intake.push(&big).unwrap_err();
        assert!(matches!(err, IntakeError::Malformed { line: 1, .. }));
    }

    #[test]
    fn test_oversized_complete_line_rejected() {
        let mut line = format!("{{\"filename\":\"{}\"}}", "a".repeat(4 * MAX_MESSAGE_BYTES));
        line.push('\n');

        let mut intake = RequestIntake::new();
        let err = intake.push(line.as_bytes()).unwrap_err();
        assert!(matches!(err, IntakeError::Malformed { line: 1, .. }));
    }

    #[test]
    fn test_line_at_limit_accepted() {
        let envelope = "{\"filename\":\"\"}".len();
        let key = "a".repeat(MAX_MESSAGE_BYTES - envelope);
        let line = format!("{{\"filename\":\"{}\"}}\n", key);
        assert_eq!(line.len(), MAX_MESSAGE_BYTES + 1);

        assert_eq!(intake(&[line.as_str()]).unwrap(), key);
    }

    #[test]
    fn test_response_json_shape() {
        let result = TranscodeResult {
            job_id: "job".to_string(),
            renditions: vec![ladder_core::Rendition::P240, ladder_core::Rendition::P360],
            source_duration_millis: 12_345,
            uploaded_objects: 6,
        };
        let json = serde_json::to_value(TranscodeResponse::completed(&result)).unwrap();
        assert_eq!(json["message"], "Transcoded successfully");
        assert_eq!(json["success"], true);
        assert_eq!(json["transcodedFiles"], serde_json::json!(["240p", "360p"]));
        assert_eq!(json["durationMillis"], 12_345);

        let json = serde_json::to_value(TranscodeResponse::failed("probe failed: x")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["transcodedFiles"], serde_json::json!([]));
        assert_eq!(json["durationMillis"], 0);
    }
}
