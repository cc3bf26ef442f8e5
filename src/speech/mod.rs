//! Speech synthesis and guarded playback
//!
//! The [`SpeechController`] is the only entry point the rest of the crate
//! uses. It enforces the one-reading-at-a-time rule and hides the engine,
//! the audio backend, and the shared volume behind a cloneable handle.

mod controller;
mod engine;
mod error;
mod playback;
mod types;

pub use controller::{SpeechController, StartOutcome};
pub use engine::{EspeakEngine, SynthesisEngine, UnavailableEngine};
pub use error::SpeechError;
pub use playback::{PlaybackBackend, PlaybackEnd, RodioPlayback, VolumeControl};
pub use types::{StopOutcome, SynthesisParams, VoiceInfo};
