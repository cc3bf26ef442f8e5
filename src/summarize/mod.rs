//! Text summarization through a remote language model

mod gemini;

pub use gemini::GeminiSummarizer;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("Summarizer not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Turns extracted text into a shorter text.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String, SummaryError>;
}
