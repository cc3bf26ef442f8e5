//! Lectura server library
//!
//! Exposes the application modules for the server binary, the optional
//! voice-command binary, and the integration tests.
//!
//! # Modules
//!
//! - `document`: extension dispatch and text extraction with OCR fallback
//! - `ocr`: OCR providers (Tesseract CLI, Ollama vision) behind one service
//! - `summarize`: remote summarization client
//! - `speech`: synthesis engine, playback, and the single-flight controller
//! - `routes`: HTTP surface

pub mod config;
pub mod document;
pub mod error;
pub mod ocr;
pub mod routes;
pub mod session;
pub mod speech;
pub mod state;
pub mod summarize;

#[cfg(feature = "voice-commands")]
pub mod voice;
