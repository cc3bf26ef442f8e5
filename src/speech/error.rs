#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("No speech engine found (tried espeak and espeak-ng)")]
    EngineNotFound,

    #[error("Synthesis failed: {0}")]
    Synthesis(String),

    #[error("Playback failed: {0}")]
    Playback(String),
}
