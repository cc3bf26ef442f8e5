//! Single-flight guard around speech playback
//!
//! At most one reading runs at a time. The guard is a tri-state machine
//! behind one mutex: `Idle` accepts a start, `Reading` refuses further
//! starts and accepts a stop, `Stopping` refuses both until the playback
//! task observes cancellation. The lock only ever covers state bookkeeping,
//! never synthesis or audio work, so handlers cannot stall behind playback.
//!
//! Only the spawned playback task returns the guard to `Idle`. Handlers
//! flip it to `Reading` or `Stopping` and get out of the way, which keeps
//! exactly one owner for every transition back to rest.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use super::engine::SynthesisEngine;
use super::error::SpeechError;
use super::playback::{PlaybackBackend, PlaybackEnd, VolumeControl};
use super::types::{StopOutcome, SynthesisParams};

/// What a start request actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The reading was accepted and playback is starting in the background.
    Started,
    /// Another reading holds the guard.
    AlreadyInProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GuardState {
    Idle,
    Reading,
    Stopping,
}

struct Guard {
    state: GuardState,
    cancel: Option<CancellationToken>,
}

struct Inner {
    engine: Arc<dyn SynthesisEngine>,
    backend: Arc<dyn PlaybackBackend>,
    params: SynthesisParams,
    volume: Arc<VolumeControl>,
    guard: Mutex<Guard>,
}

#[derive(Clone)]
pub struct SpeechController {
    inner: Arc<Inner>,
}

impl SpeechController {
    pub fn new(
        engine: Arc<dyn SynthesisEngine>,
        backend: Arc<dyn PlaybackBackend>,
        params: SynthesisParams,
        volume_percent: u8,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                engine,
                backend,
                params,
                volume: Arc::new(VolumeControl::new(volume_percent)),
                guard: Mutex::new(Guard {
                    state: GuardState::Idle,
                    cancel: None,
                }),
            }),
        }
    }

    /// Claims the guard and spawns the playback task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, text: String) -> StartOutcome {
        let cancel = CancellationToken::new();
        {
            let mut guard = self.inner.guard.lock();
            if guard.state != GuardState::Idle {
                return StartOutcome::AlreadyInProgress;
            }
            guard.state = GuardState::Reading;
            guard.cancel = Some(cancel.clone());
        }

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            match run_playback(&inner, text, cancel).await {
                Ok(end) => tracing::debug!(?end, "reading finished"),
                Err(e) => tracing::error!("reading failed: {e}"),
            }
            release(&inner);
        });
        StartOutcome::Started
    }

    /// Cancels the active reading, if any.
    pub fn stop(&self) -> StopOutcome {
        let mut guard = self.inner.guard.lock();
        match guard.state {
            GuardState::Reading => {
                if let Some(cancel) = guard.cancel.as_ref() {
                    cancel.cancel();
                }
                guard.state = GuardState::Stopping;
                StopOutcome::Stopped
            }
            GuardState::Stopping | GuardState::Idle => StopOutcome::Idle,
        }
    }

    /// True while a reading is active. A stopped reading reports false
    /// immediately, before its playback task has wound down.
    pub fn is_reading(&self) -> bool {
        self.inner.guard.lock().state == GuardState::Reading
    }

    /// Clamps to `0..=100`, applies the new volume, and returns the value
    /// actually set. An active reading picks the change up on its next poll.
    pub fn set_volume(&self, percent: i64) -> u8 {
        let clamped = percent.clamp(0, 100) as u8;
        self.inner.volume.set_percent(clamped);
        clamped
    }
}

async fn run_playback(
    inner: &Arc<Inner>,
    text: String,
    cancel: CancellationToken,
) -> Result<PlaybackEnd, SpeechError> {
    let engine = Arc::clone(&inner.engine);
    let params = inner.params.clone();
    let wav = tokio::task::spawn_blocking(move || engine.synthesize(&text, &params))
        .await
        .map_err(|e| SpeechError::Synthesis(e.to_string()))??;

    // A stop that lands during synthesis skips playback entirely.
    if cancel.is_cancelled() {
        return Ok(PlaybackEnd::Cancelled);
    }

    let backend = Arc::clone(&inner.backend);
    let volume = Arc::clone(&inner.volume);
    tokio::task::spawn_blocking(move || backend.play(wav, volume, cancel))
        .await
        .map_err(|e| SpeechError::Playback(e.to_string()))?
}

/// Returns the guard to rest. Called exactly once per playback task, on
/// success and on failure alike.
fn release(inner: &Inner) {
    let mut guard = inner.guard.lock();
    guard.state = GuardState::Idle;
    guard.cancel = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::VoiceInfo;
    use std::time::{Duration, Instant};

    struct StubEngine;

    impl SynthesisEngine for StubEngine {
        fn name(&self) -> &str {
            "stub"
        }

        fn synthesize(
            &self,
            _text: &str,
            _params: &SynthesisParams,
        ) -> Result<Vec<u8>, SpeechError> {
            Ok(vec![0; 16])
        }

        fn list_voices(&self) -> Result<Vec<VoiceInfo>, SpeechError> {
            Ok(Vec::new())
        }
    }

    struct FailingEngine;

    impl SynthesisEngine for FailingEngine {
        fn name(&self) -> &str {
            "failing"
        }

        fn synthesize(
            &self,
            _text: &str,
            _params: &SynthesisParams,
        ) -> Result<Vec<u8>, SpeechError> {
            Err(SpeechError::Synthesis("no audio today".to_string()))
        }

        fn list_voices(&self) -> Result<Vec<VoiceInfo>, SpeechError> {
            Ok(Vec::new())
        }
    }

    /// Pretends to play for a fixed duration, honouring cancellation.
    struct TimedBackend {
        duration: Duration,
    }

    impl PlaybackBackend for TimedBackend {
        fn play(
            &self,
            _wav: Vec<u8>,
            _volume: Arc<VolumeControl>,
            cancel: CancellationToken,
        ) -> Result<PlaybackEnd, SpeechError> {
            let started = Instant::now();
            while started.elapsed() < self.duration {
                if cancel.is_cancelled() {
                    return Ok(PlaybackEnd::Cancelled);
                }
                std::thread::sleep(Duration::from_millis(5));
            }
            Ok(PlaybackEnd::Finished)
        }
    }

    /// Records the gain it sees on every poll tick.
    struct RecordingBackend {
        seen: Arc<Mutex<Vec<f32>>>,
        duration: Duration,
    }

    impl PlaybackBackend for RecordingBackend {
        fn play(
            &self,
            _wav: Vec<u8>,
            volume: Arc<VolumeControl>,
            cancel: CancellationToken,
        ) -> Result<PlaybackEnd, SpeechError> {
            let started = Instant::now();
            while started.elapsed() < self.duration {
                if cancel.is_cancelled() {
                    return Ok(PlaybackEnd::Cancelled);
                }
                self.seen.lock().push(volume.gain());
                std::thread::sleep(Duration::from_millis(5));
            }
            Ok(PlaybackEnd::Finished)
        }
    }

    fn controller_with(backend: impl PlaybackBackend + 'static) -> SpeechController {
        SpeechController::new(
            Arc::new(StubEngine),
            Arc::new(backend),
            SynthesisParams::default(),
            100,
        )
    }

    fn long_playback() -> SpeechController {
        controller_with(TimedBackend {
            duration: Duration::from_secs(10),
        })
    }

    async fn wait_until(limit: Duration, mut cond: impl FnMut() -> bool) -> bool {
        let started = Instant::now();
        while started.elapsed() < limit {
            if cond() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        cond()
    }

    fn guard_is_idle(controller: &SpeechController) -> bool {
        controller.inner.guard.lock().state == GuardState::Idle
    }

    #[tokio::test]
    async fn start_reports_reading_until_stopped() {
        let controller = long_playback();
        assert!(!controller.is_reading());
        assert_eq!(controller.start("hello".to_string()), StartOutcome::Started);
        assert!(controller.is_reading());
        assert_eq!(controller.stop(), StopOutcome::Stopped);
        assert!(!controller.is_reading());
    }

    #[tokio::test]
    async fn second_start_is_rejected_while_reading() {
        let controller = long_playback();
        assert_eq!(controller.start("first".to_string()), StartOutcome::Started);
        assert_eq!(
            controller.start("second".to_string()),
            StartOutcome::AlreadyInProgress
        );
        controller.stop();
    }

    #[tokio::test]
    async fn stop_without_reading_reports_idle() {
        let controller = long_playback();
        assert_eq!(controller.stop(), StopOutcome::Idle);
        assert!(!controller.is_reading());
    }

    #[tokio::test]
    async fn repeated_stop_reports_idle() {
        let controller = long_playback();
        controller.start("text".to_string());
        assert_eq!(controller.stop(), StopOutcome::Stopped);
        assert_eq!(controller.stop(), StopOutcome::Idle);
    }

    #[tokio::test]
    async fn natural_completion_releases_the_guard() {
        let controller = controller_with(TimedBackend {
            duration: Duration::from_millis(30),
        });
        assert_eq!(controller.start("short".to_string()), StartOutcome::Started);
        assert!(wait_until(Duration::from_secs(2), || !controller.is_reading()).await);
        assert!(wait_until(Duration::from_secs(2), || guard_is_idle(&controller)).await);
        assert_eq!(controller.start("again".to_string()), StartOutcome::Started);
        controller.stop();
    }

    #[tokio::test]
    async fn engine_failure_releases_the_guard() {
        let controller = SpeechController::new(
            Arc::new(FailingEngine),
            Arc::new(TimedBackend {
                duration: Duration::from_secs(10),
            }),
            SynthesisParams::default(),
            100,
        );
        assert_eq!(controller.start("text".to_string()), StartOutcome::Started);
        assert!(wait_until(Duration::from_secs(2), || guard_is_idle(&controller)).await);
    }

    #[tokio::test]
    async fn restart_succeeds_after_stop_settles() {
        let controller = long_playback();
        controller.start("first".to_string());
        controller.stop();
        assert!(wait_until(Duration::from_secs(2), || guard_is_idle(&controller)).await);
        assert_eq!(controller.start("second".to_string()), StartOutcome::Started);
        controller.stop();
    }

    #[tokio::test]
    async fn volume_is_clamped_to_percent_range() {
        let controller = long_playback();
        assert_eq!(controller.set_volume(150), 100);
        assert_eq!(controller.set_volume(-20), 0);
        assert_eq!(controller.set_volume(65), 65);
    }

    #[tokio::test]
    async fn volume_change_reaches_active_playback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let controller = controller_with(RecordingBackend {
            seen: Arc::clone(&seen),
            duration: Duration::from_secs(10),
        });
        controller.start("text".to_string());
        assert!(wait_until(Duration::from_secs(2), || !seen.lock().is_empty()).await);
        controller.set_volume(30);
        let observed = wait_until(Duration::from_secs(2), || {
            seen.lock().iter().any(|gain| (gain - 0.3).abs() < 1e-6)
        })
        .await;
        controller.stop();
        assert!(observed);
    }
}
