//! Route modules for the Lectura server
//!
//! Endpoints:
//! - GET  /                   - Test console homepage
//! - GET  /health             - Liveness probe
//! - POST /process-file       - Upload a document and extract its text
//! - GET  /summarize-text     - Summarize the extracted text
//! - GET  /read-aloud         - Read the extracted text aloud
//! - GET  /stop-reading       - Stop the active reading
//! - GET  /reading-status     - Poll the reading flag
//! - GET  /adjust-volume      - Change playback volume
//! - GET  /summarize-and-read - Summarize, then read the summary aloud

pub mod documents;
pub mod index;
pub mod speech;
pub mod summarize;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check(State(_state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Builds the full application router over the given state.
pub fn app(state: AppState) -> Router {
    let max_upload_bytes = state.config().server.max_upload_mb * 1024 * 1024;
    Router::new()
        .route("/", get(index::homepage))
        .route("/health", get(health_check))
        .merge(documents::router(max_upload_bytes))
        .merge(summarize::router())
        .merge(speech::router())
        .with_state(state)
}
