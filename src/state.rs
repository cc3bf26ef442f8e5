//! Shared application state

use std::sync::Arc;

use crate::config::Config;
use crate::document::TextExtractor;
use crate::session::DocumentSession;
use crate::speech::SpeechController;
use crate::summarize::Summarizer;

struct AppStateInner {
    config: Config,
    session: DocumentSession,
    extractor: TextExtractor,
    summarizer: Arc<dyn Summarizer>,
    speech: SpeechController,
}

/// Cheaply cloneable handle shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

impl AppState {
    pub fn new(
        config: Config,
        extractor: TextExtractor,
        summarizer: Arc<dyn Summarizer>,
        speech: SpeechController,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                session: DocumentSession::default(),
                extractor,
                summarizer,
                speech,
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn session(&self) -> &DocumentSession {
        &self.inner.session
    }

    pub fn extractor(&self) -> &TextExtractor {
        &self.inner.extractor
    }

    pub fn summarizer(&self) -> &dyn Summarizer {
        self.inner.summarizer.as_ref()
    }

    pub fn speech(&self) -> &SpeechController {
        &self.inner.speech
    }
}
