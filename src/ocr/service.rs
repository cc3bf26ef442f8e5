//! OCR Service
//!
//! Orchestrates OCR providers with ordered fallback.

use std::sync::Arc;

use super::{
    provider::{OcrProviderTrait, OllamaProvider, TesseractProvider},
    types::{OcrError, OcrProvider, OcrResult},
};

/// OCR service configuration
pub struct OcrServiceConfig {
    /// Preferred provider order
    pub providers: Vec<OcrProvider>,
    /// Ollama base URL
    pub ollama_url: String,
    /// Ollama model name
    pub ollama_model: String,
    /// Default OCR language
    pub default_language: String,
}

impl Default for OcrServiceConfig {
    fn default() -> Self {
        Self {
            providers: vec![OcrProvider::Tesseract, OcrProvider::Ollama],
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llava".to_string(),
            default_language: "eng".to_string(),
        }
    }
}

/// OCR service for uploaded images and rasterized PDF pages
pub struct OcrService {
    config: OcrServiceConfig,
    providers: Vec<Arc<dyn OcrProviderTrait>>,
}

impl OcrService {
    /// Create a new OCR service with providers in configured order
    pub fn new(config: OcrServiceConfig) -> Self {
        let mut providers: Vec<Arc<dyn OcrProviderTrait>> = Vec::new();

        for provider in &config.providers {
            match provider {
                OcrProvider::Tesseract => {
                    providers.push(Arc::new(TesseractProvider::new(&config.default_language)));
                }
                OcrProvider::Ollama => {
                    providers.push(Arc::new(OllamaProvider::new(
                        &config.ollama_url,
                        &config.ollama_model,
                    )));
                }
            }
        }

        Self { config, providers }
    }

    #[cfg(test)]
    pub(crate) fn with_providers(
        config: OcrServiceConfig,
        providers: Vec<Arc<dyn OcrProviderTrait>>,
    ) -> Self {
        Self { config, providers }
    }

    /// Get available providers
    pub async fn available_providers(&self) -> Vec<OcrProvider> {
        let mut available = Vec::new();
        for provider in &self.providers {
            if provider.is_available().await {
                available.push(provider.provider_type());
            }
        }
        available
    }

    /// Perform OCR on an image, trying providers in order
    pub async fn recognize(
        &self,
        image_data: &[u8],
        language: Option<&str>,
    ) -> Result<OcrResult, OcrError> {
        let lang = language.unwrap_or(&self.config.default_language);

        for provider in &self.providers {
            if provider.is_available().await {
                match provider.recognize(image_data, Some(lang)).await {
                    Ok(result) => {
                        tracing::debug!(
                            provider = ?result.provider,
                            confidence = result.confidence,
                            chars = result.text.len(),
                            "OCR complete"
                        );
                        return Ok(result);
                    }
                    Err(e) => {
                        tracing::warn!(
                            "OCR provider {:?} failed: {}, trying next",
                            provider.provider_type(),
                            e
                        );
                        continue;
                    }
                }
            }
        }

        Err(OcrError::ProviderNotAvailable(
            "No OCR providers available".to_string(),
        ))
    }

    /// OCR a batch of rendered pages, joining the results with newlines
    pub async fn recognize_pages(
        &self,
        pages: &[Vec<u8>],
        language: Option<&str>,
    ) -> Result<String, OcrError> {
        let mut sections = Vec::with_capacity(pages.len());
        for (index, page) in pages.iter().enumerate() {
            let result = self.recognize(page, language).await?;
            tracing::debug!(page = index + 1, chars = result.text.len(), "Page OCR done");
            sections.push(result.text);
        }
        Ok(sections.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::MockProvider;

    fn mock(provider: OcrProvider, text: Option<&str>, available: bool) -> Arc<MockProvider> {
        Arc::new(MockProvider {
            provider,
            text: text.map(|t| t.to_string()),
            available,
        })
    }

    #[tokio::test]
    async fn test_ocr_service_creation() {
        let service = OcrService::new(OcrServiceConfig::default());
        assert_eq!(service.providers.len(), 2);
    }

    #[tokio::test]
    async fn test_first_available_provider_wins() {
        let service = OcrService::with_providers(
            OcrServiceConfig::default(),
            vec![
                mock(OcrProvider::Tesseract, Some("from tesseract"), true),
                mock(OcrProvider::Ollama, Some("from ollama"), true),
            ],
        );

        let result = service.recognize(b"img", None).await.unwrap();
        assert_eq!(result.text, "from tesseract");
        assert_eq!(result.provider, OcrProvider::Tesseract);
    }

    #[tokio::test]
    async fn test_unavailable_provider_skipped() {
        let service = OcrService::with_providers(
            OcrServiceConfig::default(),
            vec![
                mock(OcrProvider::Tesseract, Some("from tesseract"), false),
                mock(OcrProvider::Ollama, Some("from ollama"), true),
            ],
        );

        let result = service.recognize(b"img", None).await.unwrap();
        assert_eq!(result.provider, OcrProvider::Ollama);
    }

    #[tokio::test]
    async fn test_failing_provider_falls_through() {
        let service = OcrService::with_providers(
            OcrServiceConfig::default(),
            vec![
                mock(OcrProvider::Tesseract, None, true),
                mock(OcrProvider::Ollama, Some("recovered"), true),
            ],
        );

        let result = service.recognize(b"img", None).await.unwrap();
        assert_eq!(result.text, "recovered");
    }

    #[tokio::test]
    async fn test_no_providers_available() {
        let service = OcrService::with_providers(
            OcrServiceConfig::default(),
            vec![mock(OcrProvider::Tesseract, Some("x"), false)],
        );

        let result = service.recognize(b"img", None).await;
        assert!(matches!(result, Err(OcrError::ProviderNotAvailable(_))));
    }

    #[tokio::test]
    async fn test_recognize_pages_joins_with_newlines() {
        let service = OcrService::with_providers(
            OcrServiceConfig::default(),
            vec![mock(OcrProvider::Tesseract, Some("page text"), true)],
        );

        let pages = vec![vec![1u8], vec![2u8], vec![3u8]];
        let text = service.recognize_pages(&pages, None).await.unwrap();
        assert_eq!(text, "page text\npage text\npage text");
    }
}
