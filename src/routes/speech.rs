//! Read-aloud control routes

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::speech::{StartOutcome, StopOutcome};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct VolumeQuery {
    volume: Option<i64>,
}

#[derive(Serialize)]
pub struct SpeechResponse {
    pub message: String,
    pub status: String,
}

#[derive(Serialize)]
pub struct ReadingStatusResponse {
    pub is_reading: bool,
}

#[derive(Serialize)]
pub struct VolumeResponse {
    pub message: String,
    pub volume: u8,
}

#[derive(Serialize)]
pub struct SummarizeAndReadResponse {
    pub summary: String,
    pub message: String,
    pub status: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/read-aloud", get(read_aloud))
        .route("/stop-reading", get(stop_reading))
        .route("/reading-status", get(reading_status))
        .route("/adjust-volume", get(adjust_volume))
        .route("/summarize-and-read", get(summarize_and_read))
}

/// GET /read-aloud?volume=N
///
/// Starts reading the current session document in the background. Refused
/// while another reading is active.
async fn read_aloud(
    State(state): State<AppState>,
    Query(query): Query<VolumeQuery>,
) -> Result<Json<SpeechResponse>> {
    let document = state
        .session()
        .current()
        .await
        .ok_or_else(|| AppError::BadRequest("No text has been extracted yet".to_string()))?;

    if let Some(volume) = query.volume {
        state.speech().set_volume(volume);
    }

    match state.speech().start(document.text) {
        StartOutcome::Started => Ok(Json(SpeechResponse {
            message: "Reading text aloud".to_string(),
            status: "started".to_string(),
        })),
        StartOutcome::AlreadyInProgress => Err(AppError::ReadingInProgress),
    }
}

/// GET /stop-reading
async fn stop_reading(State(state): State<AppState>) -> Json<SpeechResponse> {
    let (message, status) = match state.speech().stop() {
        StopOutcome::Stopped => ("Reading stopped", "stopped"),
        StopOutcome::Idle => ("No reading in progress", "idle"),
    };
    Json(SpeechResponse {
        message: message.to_string(),
        status: status.to_string(),
    })
}

/// GET /reading-status
async fn reading_status(State(state): State<AppState>) -> Json<ReadingStatusResponse> {
    Json(ReadingStatusResponse {
        is_reading: state.speech().is_reading(),
    })
}

/// GET /adjust-volume?volume=N
///
/// Applies the clamped volume and echoes the value actually set.
async fn adjust_volume(
    State(state): State<AppState>,
    Query(query): Query<VolumeQuery>,
) -> Json<VolumeResponse> {
    let requested = query.volume.unwrap_or(80);
    let volume = state.speech().set_volume(requested);
    Json(VolumeResponse {
        message: format!("Volume adjusted to {volume}%"),
        volume,
    })
}

/// GET /summarize-and-read
///
/// Summarizes the current session document and starts reading the summary.
/// The summary is returned either way; the message and status fields say
/// whether playback actually started.
async fn summarize_and_read(
    State(state): State<AppState>,
) -> Result<Json<SummarizeAndReadResponse>> {
    let document = state
        .session()
        .current()
        .await
        .ok_or_else(|| AppError::BadRequest("No text has been extracted yet".to_string()))?;

    let summary = state.summarizer().summarize(&document.text).await?;

    let (message, status) = match state.speech().start(summary.clone()) {
        StartOutcome::Started => ("Reading summary aloud", "started"),
        StartOutcome::AlreadyInProgress => {
            ("Summary created but reading already in progress", "queued")
        }
    };

    Ok(Json(SummarizeAndReadResponse {
        summary,
        message: message.to_string(),
        status: status.to_string(),
    }))
}
