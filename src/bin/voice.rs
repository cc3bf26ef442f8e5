//! Voice-command entry point
//!
//! Listens for one spoken command. When it contains a read keyword, the
//! named file's text is extracted and read aloud to completion.
//!
//! Usage: `lectura-voice [FILE]` (defaults to `image.png`)

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lectura_server::config::Config;
use lectura_server::document::TextExtractor;
use lectura_server::ocr::{OcrService, OcrServiceConfig};
use lectura_server::speech::{
    EspeakEngine, PlaybackBackend, RodioPlayback, SynthesisEngine, SynthesisParams, VolumeControl,
};
use lectura_server::voice::{matches_command, VoiceListener};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lectura_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env();

    let listener = VoiceListener::new(&config.voice.model_path)?;
    println!("Speak your command (e.g. 'read file')...");
    let transcript = tokio::task::spawn_blocking(move || listener.listen_once()).await??;
    println!("You said: {transcript}");

    if !matches_command(&transcript) {
        println!("Command not recognized. Try saying 'read file' or similar.");
        return Ok(());
    }

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "image.png".to_string());
    if !Path::new(&path).exists() {
        anyhow::bail!("File not found: {path}");
    }
    let data = tokio::fs::read(&path).await?;

    let ocr = Arc::new(OcrService::new(OcrServiceConfig {
        ollama_url: config.ocr.ollama_url.clone(),
        ollama_model: config.ocr.ollama_model.clone(),
        default_language: config.ocr.language.clone(),
        ..OcrServiceConfig::default()
    }));
    let extractor = TextExtractor::new(ocr);
    let extracted = extractor.extract(&path, data).await?;
    println!("\nExtracted text:\n\n{}", extracted.text);
    println!("\nDetected language: {}", extracted.language);

    println!("\nReading aloud...");
    let engine = EspeakEngine::detect()?;
    let params = SynthesisParams {
        voice: config.speech.voice.clone(),
        rate: config.speech.rate,
    };
    let text = extracted.text;
    let wav = tokio::task::spawn_blocking(move || engine.synthesize(&text, &params)).await??;

    let volume = Arc::new(VolumeControl::new(config.speech.volume));
    let cancel = CancellationToken::new();
    tokio::task::spawn_blocking(move || RodioPlayback.play(wav, volume, cancel)).await??;

    Ok(())
}
