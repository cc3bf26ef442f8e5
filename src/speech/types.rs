use serde::Serialize;

/// One entry from the engine's voice inventory.
#[derive(Debug, Clone, Serialize)]
pub struct VoiceInfo {
    pub id: String,
    pub name: String,
    pub language: String,
}

/// Settings handed to the engine for every synthesis call.
#[derive(Debug, Clone)]
pub struct SynthesisParams {
    /// Engine voice identifier. `None` keeps the engine default.
    pub voice: Option<String>,
    /// Speaking rate in words per minute.
    pub rate: u32,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            voice: None,
            rate: 150,
        }
    }
}

/// What a stop request actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// A reading was in progress and has been told to stop.
    Stopped,
    /// Nothing was playing.
    Idle,
}
