//! Summarization routes

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Serialize)]
pub struct SummarizeResponse {
    pub summary: String,
    pub original_text: String,
    pub filename: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/summarize-text", get(summarize_text))
}

/// GET /summarize-text
///
/// Summarizes the current session document.
async fn summarize_text(State(state): State<AppState>) -> Result<Json<SummarizeResponse>> {
    let document = state
        .session()
        .current()
        .await
        .ok_or_else(|| AppError::BadRequest("No text has been extracted yet".to_string()))?;

    let summary = state.summarizer().summarize(&document.text).await?;

    Ok(Json(SummarizeResponse {
        summary,
        original_text: document.text,
        filename: document.filename,
    }))
}
