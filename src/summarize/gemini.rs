//! Gemini REST client for summarization
//!
//! Talks to the `generateContent` endpoint directly over HTTPS. Only the
//! pieces of the response we need (candidate text parts) are modelled.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Summarizer, SummaryError};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiSummarizer {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiSummarizer {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn build_prompt(text: &str) -> String {
        format!(
            "Please summarize the following text concisely:\n\n{}",
            text
        )
    }

    /// Pulls the text parts out of the first candidate and joins them.
    fn parse_summary(body: &Value) -> Result<String, SummaryError> {
        let parts = body
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
            .ok_or_else(|| {
                SummaryError::MalformedResponse("no candidates in response".to_string())
            })?;

        let summary = parts
            .iter()
            .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
            .collect::<Vec<_>>()
            .join("");

        let summary = summary.trim().to_string();
        if summary.is_empty() {
            return Err(SummaryError::MalformedResponse(
                "candidate contained no text".to_string(),
            ));
        }
        Ok(summary)
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, SummaryError> {
        if !self.is_configured() {
            return Err(SummaryError::NotConfigured(
                "GEMINI_API_KEY is not set".to_string(),
            ));
        }

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            GEMINI_API_BASE, self.model, self.api_key
        );
        let request = json!({
            "contents": [{
                "parts": [{ "text": Self::build_prompt(text) }]
            }]
        });

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SummaryError::ApiError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummaryError::ApiError(format!(
                "Gemini returned {}: {}",
                status, body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SummaryError::MalformedResponse(e.to_string()))?;
        Self::parse_summary(&body)
    }
}
