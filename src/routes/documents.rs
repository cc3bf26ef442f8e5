//! Document upload and text extraction routes

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::session::ExtractedDocument;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ProcessFileResponse {
    pub text: String,
    pub filename: String,
}

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/process-file", post(process_file))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// POST /process-file
///
/// Accepts one multipart `file` field, extracts its text, and stores the
/// result as the current session document.
async fn process_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ProcessFileResponse>> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("").to_string();
        if filename.is_empty() {
            return Err(AppError::BadRequest("No selected file".to_string()));
        }
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read file data: {e}")))?;
        upload = Some((filename, data.to_vec()));
        break;
    }

    let (filename, data) =
        upload.ok_or_else(|| AppError::BadRequest("No file part".to_string()))?;

    let extracted = state.extractor().extract(&filename, data).await?;

    tracing::info!(
        filename = %filename,
        chars = extracted.text.len(),
        language = %extracted.language,
        "document processed"
    );

    state
        .session()
        .store(ExtractedDocument {
            text: extracted.text.clone(),
            filename: filename.clone(),
            language: extracted.language,
        })
        .await;

    Ok(Json(ProcessFileResponse {
        text: extracted.text,
        filename,
    }))
}
