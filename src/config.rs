//! Configuration management for the Lectura server

use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub summarizer: SummarizerConfig,
    pub ocr: OcrConfig,
    pub speech: SpeechConfig,
    pub voice: VoiceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_mb: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummarizerConfig {
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    /// Tesseract language code, e.g. "eng".
    pub language: String,
    pub ollama_url: String,
    pub ollama_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    /// Engine voice id; `None` uses the engine default.
    pub voice: Option<String>,
    /// Words per minute.
    pub rate: u32,
    /// Initial playback volume, percent.
    pub volume: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoiceConfig {
    pub model_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                max_upload_mb: 50,
            },
            summarizer: SummarizerConfig {
                api_key: String::new(),
                model: "gemini-pro".to_string(),
            },
            ocr: OcrConfig {
                language: "eng".to_string(),
                ollama_url: "http://localhost:11434".to_string(),
                ollama_model: "llava".to_string(),
            },
            speech: SpeechConfig {
                voice: None,
                rate: 150,
                volume: 100,
            },
            voice: VoiceConfig {
                model_path: "models/vosk-model-small-en-us-0.15".to_string(),
            },
        }
    }
}

impl Config {
    /// Build from environment variables; every field has a default.
    pub fn from_env() -> Self {
        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()
                    .unwrap_or(5000),
                max_upload_mb: env::var("MAX_UPLOAD_MB")
                    .unwrap_or_else(|_| "50".to_string())
                    .parse()
                    .unwrap_or(50),
            },
            summarizer: SummarizerConfig {
                api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
                model: env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-pro".to_string()),
            },
            ocr: OcrConfig {
                language: env::var("OCR_LANGUAGE").unwrap_or_else(|_| "eng".to_string()),
                ollama_url: env::var("OLLAMA_URL")
                    .unwrap_or_else(|_| "http://localhost:11434".to_string()),
                ollama_model: env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llava".to_string()),
            },
            speech: SpeechConfig {
                voice: env::var("SPEECH_VOICE").ok(),
                rate: env::var("SPEECH_RATE")
                    .unwrap_or_else(|_| "150".to_string())
                    .parse()
                    .unwrap_or(150),
                volume: env::var("SPEECH_VOLUME")
                    .unwrap_or_else(|_| "100".to_string())
                    .parse()
                    .unwrap_or(100),
            },
            voice: VoiceConfig {
                model_path: env::var("VOSK_MODEL_PATH")
                    .unwrap_or_else(|_| "models/vosk-model-small-en-us-0.15".to_string()),
            },
        }
    }
}
