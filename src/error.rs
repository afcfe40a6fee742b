//! # Error Types
//!
//! Ingest failures are per-request: each one becomes a `400` with an error
//! payload and the collector keeps serving. Config failures only matter at
//! startup.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::path::PathBuf;
use thiserror::Error;

/// Why a posted reading was not stored
#[derive(Debug, Error)]
pub enum IngestError {
    /// Request body could not be read off the connection
    #[error("failed to read request body: {0}")]
    BodyRead(String),

    /// Body is not valid JSON
    #[error("malformed JSON body: {0}")]
    MalformedBody(#[source] serde_json::Error),

    /// Body is valid JSON but not an object (e.g. a bare number)
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// Reading could not be re-encoded for the log file
    #[error("failed to encode reading: {0}")]
    Encode(#[source] serde_json::Error),

    /// Opening, writing or flushing the daily log file failed
    #[error("failed to write {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "status": "error",
            "message": self.to_string(),
        });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// Configuration loading / validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value {value:?} for {var}")]
    Env { var: &'static str, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
