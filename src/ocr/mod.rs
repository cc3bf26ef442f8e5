//! OCR Module
//!
//! Optical character recognition for uploaded images and scanned PDF pages.
//!
//! Supports multiple backends behind one service:
//! - Tesseract (local CLI, requires installation)
//! - Ollama vision models (local LLM)
//!
//! Providers are tried in configured order; a failing provider logs a warning
//! and the next one is attempted.

mod provider;
mod service;
mod types;

pub use provider::{OcrProviderTrait, OllamaProvider, TesseractProvider};
pub use service::{OcrService, OcrServiceConfig};
pub use types::{OcrError, OcrProvider, OcrResult};

#[cfg(test)]
pub use provider::MockProvider;
