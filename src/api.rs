//! ==============================================================================
//! api.rs - http surface of the collector
//! ==============================================================================
//!
//! ```text
//!     POST /plant_data   json object  -> 200 {"status":"success"}
//!                                     -> 400 {"status":"error","message":...}
//!     GET  /latest                    -> 200 newest stamped reading
//!                                     -> 404 {"status":"no data"}
//!     GET  /stats                     -> 200 {count, avg/min/max_moisture}
//!                                     -> 404 {"status":"no data"}
//! ```
//!
//! the body of /plant_data is read as raw bytes so content-type is not
//! enforced; sensor firmware is not always careful about headers. there is no
//! body size cap, and a body that cannot be read is a 400 like any other
//! rejected reading.
//!
//! ==============================================================================

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::error::IngestError;
use crate::service::IngestService;

/// build the router around a shared service
pub fn router(service: Arc<IngestService>) -> Router {
    Router::new()
        .route("/plant_data", post(ingest_handler))
        .route("/latest", get(latest_handler))
        .route("/stats", get(stats_handler))
        .layer(DefaultBodyLimit::disable())
        .layer(CorsLayer::permissive())
        .with_state(service)
}

async fn ingest_handler(
    State(service): State<Arc<IngestService>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = match body {
        Ok(body) => service.ingest(&body).await,
        Err(rejection) => Err(IngestError::BodyRead(rejection.body_text())),
    };
    match result {
        Ok(_) => (StatusCode::OK, Json(serde_json::json!({"status": "success"}))).into_response(),
        Err(e) => {
            warn!("rejected reading: {}", e);
            e.into_response()
        }
    }
}

async fn latest_handler(State(service): State<Arc<IngestService>>) -> Response {
    match service.latest().await {
        Some(reading) => Json(reading).into_response(),
        None => no_data(),
    }
}

async fn stats_handler(State(service): State<Arc<IngestService>>) -> Response {
    match service.stats().await {
        Some(stats) => Json(stats).into_response(),
        None => no_data(),
    }
}

fn no_data() -> Response {
    (StatusCode::NOT_FOUND, Json(serde_json::json!({"status": "no data"}))).into_response()
}
