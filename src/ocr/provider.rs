//! OCR Providers
//!
//! Defines the provider trait and implementations for the OCR backends.

use async_trait::async_trait;
use tokio::process::Command;

use super::types::{OcrError, OcrProvider, OcrResult};

/// OCR provider trait
#[async_trait]
pub trait OcrProviderTrait: Send + Sync {
    /// Get the provider type
    fn provider_type(&self) -> OcrProvider;

    /// Check if the provider is available
    async fn is_available(&self) -> bool;

    /// Perform OCR on a whole image
    async fn recognize(
        &self,
        image_data: &[u8],
        language: Option<&str>,
    ) -> Result<OcrResult, OcrError>;
}

/// Tesseract OCR provider
///
/// Shells out to the `tesseract` CLI over temp files; the image is written
/// under a unique name and both temp files are removed afterward.
pub struct TesseractProvider {
    default_language: String,
}

impl TesseractProvider {
    pub fn new(default_language: &str) -> Self {
        Self {
            default_language: default_language.to_string(),
        }
    }
}

#[async_trait]
impl OcrProviderTrait for TesseractProvider {
    fn provider_type(&self) -> OcrProvider {
        OcrProvider::Tesseract
    }

    async fn is_available(&self) -> bool {
        Command::new("tesseract")
            .arg("--version")
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    async fn recognize(
        &self,
        image_data: &[u8],
        language: Option<&str>,
    ) -> Result<OcrResult, OcrError> {
        let lang = language.unwrap_or(&self.default_language);

        let temp_dir = std::env::temp_dir();
        let input_path = temp_dir.join(format!("ocr_input_{}.png", uuid::Uuid::new_v4()));
        let output_base = temp_dir.join(format!("ocr_output_{}", uuid::Uuid::new_v4()));

        tokio::fs::write(&input_path, image_data)
            .await
            .map_err(|e| OcrError::ProcessingError(format!("Failed to write temp file: {}", e)))?;

        let output = Command::new("tesseract")
            .arg(&input_path)
            .arg(&output_base)
            .arg("-l")
            .arg(lang)
            .arg("--oem")
            .arg("3")
            .arg("--psm")
            .arg("3")
            .output()
            .await;

        let _ = tokio::fs::remove_file(&input_path).await;

        let output = output
            .map_err(|e| OcrError::ProcessingError(format!("Failed to run tesseract: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::ProcessingError(format!(
                "Tesseract failed: {}",
                stderr
            )));
        }

        // Tesseract appends .txt to the output base name
        let output_file = format!("{}.txt", output_base.display());
        let text = tokio::fs::read_to_string(&output_file)
            .await
            .map_err(|e| OcrError::ProcessingError(format!("Failed to read output: {}", e)))?;

        let _ = tokio::fs::remove_file(&output_file).await;

        Ok(OcrResult {
            text: text.trim().to_string(),
            confidence: 80.0, // Tesseract does not report confidence on this path
            provider: OcrProvider::Tesseract,
        })
    }
}

/// Ollama vision model provider
pub struct OllamaProvider {
    base_url: String,
    /// Model name (e.g. "llava", "bakllava")
    model: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl OcrProviderTrait for OllamaProvider {
    fn provider_type(&self) -> OcrProvider {
        OcrProvider::Ollama
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn recognize(
        &self,
        image_data: &[u8],
        language: Option<&str>,
    ) -> Result<OcrResult, OcrError> {
        use base64::Engine;

        let url = format!("{}/api/generate", self.base_url);
        let image_base64 = base64::engine::general_purpose::STANDARD.encode(image_data);

        let lang_hint = language
            .map(|l| format!(" The text is in {}.", l))
            .unwrap_or_default();
        let prompt = format!(
            "Extract all text from this page exactly as written.{} Return only the extracted text, nothing else.",
            lang_hint
        );

        let request = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "images": [image_base64],
            "stream": false
        });

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| OcrError::ApiError(format!("Failed to call Ollama: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::ApiError(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| OcrError::ApiError(format!("Failed to parse response: {}", e)))?;

        let text = result["response"]
            .as_str()
            .unwrap_or("")
            .trim()
            .to_string();

        Ok(OcrResult {
            text,
            confidence: 75.0, // LLMs do not provide confidence scores
            provider: OcrProvider::Ollama,
        })
    }
}

/// Mock provider for testing
#[cfg(test)]
pub struct MockProvider {
    pub provider: OcrProvider,
    /// Text to return; `None` makes recognition fail.
    pub text: Option<String>,
    pub available: bool,
}

#[cfg(test)]
#[async_trait]
impl OcrProviderTrait for MockProvider {
    fn provider_type(&self) -> OcrProvider {
        self.provider
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    async fn recognize(
        &self,
        _image_data: &[u8],
        _language: Option<&str>,
    ) -> Result<OcrResult, OcrError> {
        match &self.text {
            Some(text) => Ok(OcrResult {
                text: text.clone(),
                confidence: 99.0,
                provider: self.provider,
            }),
            None => Err(OcrError::ProcessingError("mock recognition failure".into())),
        }
    }
}
