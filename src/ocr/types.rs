//! OCR Types

/// OCR provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcrProvider {
    /// Tesseract OCR (local CLI)
    Tesseract,
    /// Ollama vision model (local LLM)
    Ollama,
}

impl Default for OcrProvider {
    fn default() -> Self {
        Self::Tesseract
    }
}

/// OCR result
#[derive(Debug, Clone)]
pub struct OcrResult {
    /// Recognized text
    pub text: String,
    /// Confidence score (0-100)
    pub confidence: f64,
    /// Provider used
    pub provider: OcrProvider,
}

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR provider not available: {0}")]
    ProviderNotAvailable(String),

    #[error("OCR processing failed: {0}")]
    ProcessingError(String),

    #[error("API error: {0}")]
    ApiError(String),
}
