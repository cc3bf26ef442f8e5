//! Audio playback with cooperative cancellation
//!
//! The rodio backend owns its output stream for the duration of one play
//! call, so the whole call blocks and runs on the blocking thread pool. A
//! shared [`VolumeControl`] lets the HTTP layer adjust gain while audio is
//! already playing.

use std::io::Cursor;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink};
use tokio_util::sync::CancellationToken;

use super::error::SpeechError;

/// How often an active play loop checks for cancellation and volume changes.
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Playback gain shared between the controller and the active play loop.
///
/// Stores the gain as `f32` bits so readers never see a torn value.
pub struct VolumeControl {
    bits: AtomicU32,
}

impl VolumeControl {
    pub fn new(percent: u8) -> Self {
        let control = Self {
            bits: AtomicU32::new(0),
        };
        control.set_percent(percent);
        control
    }

    pub fn set_percent(&self, percent: u8) {
        let gain = f32::from(percent.min(100)) / 100.0;
        self.bits.store(gain.to_bits(), Ordering::SeqCst);
    }

    /// Gain in `0.0..=1.0`, as rodio sinks expect.
    pub fn gain(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::SeqCst))
    }

    pub fn percent(&self) -> u8 {
        (self.gain() * 100.0).round() as u8
    }
}

/// How a play call came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEnd {
    /// The audio ran to completion.
    Finished,
    /// The cancellation token fired and playback was cut short.
    Cancelled,
}

/// Plays one WAV buffer to completion or cancellation. Blocking.
pub trait PlaybackBackend: Send + Sync {
    fn play(
        &self,
        wav: Vec<u8>,
        volume: Arc<VolumeControl>,
        cancel: CancellationToken,
    ) -> Result<PlaybackEnd, SpeechError>;
}

pub struct RodioPlayback;

impl PlaybackBackend for RodioPlayback {
    fn play(
        &self,
        wav: Vec<u8>,
        volume: Arc<VolumeControl>,
        cancel: CancellationToken,
    ) -> Result<PlaybackEnd, SpeechError> {
        // The stream handle must outlive the sink, so it is created here on
        // the blocking thread rather than held in shared state.
        let (_stream, handle) = OutputStream::try_default()
            .map_err(|e| SpeechError::Playback(format!("no audio output device: {e}")))?;
        let sink = Sink::try_new(&handle).map_err(|e| SpeechError::Playback(e.to_string()))?;
        let source = Decoder::new(Cursor::new(wav))
            .map_err(|e| SpeechError::Playback(format!("undecodable audio: {e}")))?;

        sink.set_volume(volume.gain());
        sink.append(source);

        loop {
            if cancel.is_cancelled() {
                sink.stop();
                return Ok(PlaybackEnd::Cancelled);
            }
            if sink.empty() {
                return Ok(PlaybackEnd::Finished);
            }
            sink.set_volume(volume.gain());
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_maps_percent_to_unit_gain() {
        let control = VolumeControl::new(80);
        assert!((control.gain() - 0.8).abs() < f32::EPSILON);
        assert_eq!(control.percent(), 80);
    }

    #[test]
    fn volume_clamps_above_full() {
        let control = VolumeControl::new(100);
        control.set_percent(250);
        assert_eq!(control.percent(), 100);
        assert!((control.gain() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn volume_floor_is_silent() {
        let control = VolumeControl::new(0);
        assert_eq!(control.percent(), 0);
        assert!(control.gain().abs() < f32::EPSILON);
    }
}
