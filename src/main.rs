//! Lectura Server
//!
//! An accessibility-focused document service: OCR text extraction from
//! uploaded PDFs and images, summarization through the Gemini API, and
//! local read-aloud with live volume control.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lectura_server::config::Config;
use lectura_server::document::TextExtractor;
use lectura_server::ocr::{OcrService, OcrServiceConfig};
use lectura_server::routes;
use lectura_server::speech::{
    EspeakEngine, RodioPlayback, SpeechController, SynthesisEngine, SynthesisParams,
    UnavailableEngine,
};
use lectura_server::state::AppState;
use lectura_server::summarize::GeminiSummarizer;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lectura_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    tracing::info!("Starting Lectura Server v{}", env!("CARGO_PKG_VERSION"));

    // Initialize OCR
    let ocr = Arc::new(OcrService::new(OcrServiceConfig {
        ollama_url: config.ocr.ollama_url.clone(),
        ollama_model: config.ocr.ollama_model.clone(),
        default_language: config.ocr.language.clone(),
        ..OcrServiceConfig::default()
    }));
    let available = ocr.available_providers().await;
    if available.is_empty() {
        tracing::warn!("No OCR providers available; uploads will fail until one is installed");
    } else {
        tracing::info!("OCR providers available: {:?}", available);
    }
    let extractor = TextExtractor::new(Arc::clone(&ocr));

    // Initialize summarizer
    let summarizer = GeminiSummarizer::new(
        config.summarizer.api_key.clone(),
        config.summarizer.model.clone(),
    );
    if !summarizer.is_configured() {
        tracing::warn!("GEMINI_API_KEY not set; summarization endpoints will return errors");
    }

    // Initialize speech; a missing engine degrades to errors on /read-aloud
    let engine: Arc<dyn SynthesisEngine> = match EspeakEngine::detect() {
        Ok(engine) => {
            match engine.list_voices() {
                Ok(voices) => {
                    tracing::info!("Speech engine '{}': {} voices", engine.name(), voices.len())
                }
                Err(e) => tracing::warn!("Failed to list voices: {}", e),
            }
            Arc::new(engine)
        }
        Err(e) => {
            tracing::warn!("{}; read-aloud endpoints will return errors", e);
            Arc::new(UnavailableEngine)
        }
    };
    let speech = SpeechController::new(
        engine,
        Arc::new(RodioPlayback),
        SynthesisParams {
            voice: config.speech.voice.clone(),
            rate: config.speech.rate,
        },
        config.speech.volume,
    );

    // Create application state
    let app_state = AppState::new(config.clone(), extractor, Arc::new(summarizer), speech);

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = routes::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server with graceful shutdown
    let ip: IpAddr = config.server.host.parse().unwrap_or_else(|_| {
        tracing::warn!("Invalid SERVER_HOST '{}', using 0.0.0.0", config.server.host);
        IpAddr::from([0, 0, 0, 0])
    });
    let addr = SocketAddr::new(ip, config.server.port);
    tracing::info!("Lectura Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    tracing::info!("Server shutdown complete");
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
