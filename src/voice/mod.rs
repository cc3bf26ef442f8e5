//! Voice-command capture and recognition
//!
//! Feature-gated module behind `voice-commands`, used by the
//! `lectura-voice` binary. Captures microphone audio through cpal, feeds
//! 16 kHz mono PCM to a Vosk model, and returns the first finalized
//! utterance.

use std::sync::mpsc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use vosk::{CompleteResult, DecodingState, Model, Recognizer};

/// Keywords that make an utterance count as a read command.
pub const COMMAND_KEYWORDS: [&str; 4] = ["read", "open", "file", "start"];

/// Sample rate the recognizer expects.
pub const SAMPLE_RATE: u32 = 16_000;

#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("Failed to load Vosk model from {0}")]
    ModelLoad(String),

    #[error("Failed to create recognizer")]
    Recognizer,

    #[error("No input device available")]
    NoInputDevice,

    #[error("Audio capture failed: {0}")]
    Capture(String),

    #[error("Recognition failed: {0}")]
    Recognition(String),
}

pub struct VoiceListener {
    model: Model,
}

impl VoiceListener {
    pub fn new(model_path: &str) -> Result<Self, VoiceError> {
        if !std::path::Path::new(model_path).exists() {
            return Err(VoiceError::ModelLoad(model_path.to_string()));
        }
        let model =
            Model::new(model_path).ok_or_else(|| VoiceError::ModelLoad(model_path.to_string()))?;
        Ok(Self { model })
    }

    /// Blocks until one utterance is finalized and returns its transcript.
    pub fn listen_once(&self) -> Result<String, VoiceError> {
        let mut recognizer =
            Recognizer::new(&self.model, SAMPLE_RATE as f32).ok_or(VoiceError::Recognizer)?;

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(VoiceError::NoInputDevice)?;
        let sample_format = device
            .default_input_config()
            .map_err(|e| VoiceError::Capture(e.to_string()))?
            .sample_format();

        let config = StreamConfig {
            channels: 1,
            sample_rate: SampleRate(SAMPLE_RATE),
            buffer_size: cpal::BufferSize::Default,
        };

        let (tx, rx) = mpsc::channel::<Vec<i16>>();
        let err_fn = |err| tracing::error!("audio stream error: {err}");

        let stream = match sample_format {
            SampleFormat::I16 => device
                .build_input_stream(
                    &config,
                    move |data: &[i16], _: &_| {
                        let _ = tx.send(data.to_vec());
                    },
                    err_fn,
                    None,
                )
                .map_err(|e| VoiceError::Capture(e.to_string()))?,
            SampleFormat::F32 => device
                .build_input_stream(
                    &config,
                    move |data: &[f32], _: &_| {
                        let converted = data
                            .iter()
                            .map(|s| (s.clamp(-1.0, 1.0) * 32767.0).round() as i16)
                            .collect();
                        let _ = tx.send(converted);
                    },
                    err_fn,
                    None,
                )
                .map_err(|e| VoiceError::Capture(e.to_string()))?,
            other => {
                return Err(VoiceError::Capture(format!(
                    "unsupported sample format {other:?}"
                )))
            }
        };

        stream
            .play()
            .map_err(|e| VoiceError::Capture(e.to_string()))?;

        loop {
            let samples = rx.recv().map_err(|e| VoiceError::Capture(e.to_string()))?;
            let state = recognizer
                .accept_waveform(&samples)
                .map_err(|e| VoiceError::Recognition(format!("{e:?}")))?;
            match state {
                DecodingState::Finalized => {
                    if let Some(text) = transcript_from(recognizer.result()) {
                        return Ok(text);
                    }
                }
                DecodingState::Running => {}
                DecodingState::Failed => {
                    return Err(VoiceError::Recognition(
                        "recognizer rejected audio chunk".to_string(),
                    ))
                }
            }
        }
    }
}

fn transcript_from(result: CompleteResult) -> Option<String> {
    let text = match result {
        CompleteResult::Single(single) => single.text.to_string(),
        CompleteResult::Multiple(multiple) => multiple
            .alternatives
            .first()
            .map(|alt| alt.text.to_string())
            .unwrap_or_default(),
    };
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// True when the transcript contains any of the trigger keywords.
pub fn matches_command(transcript: &str) -> bool {
    let lowered = transcript.to_lowercase();
    COMMAND_KEYWORDS.iter().any(|word| lowered.contains(word))
}
