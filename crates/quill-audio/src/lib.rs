//! Quill Audio crate - microphone capture producing one WAV artifact per cycle.
//!
//! Provides the `AudioCaptureService` abstraction, the cycle-scoped
//! `AudioArtifact`, and a mock implementation for testing without real
//! audio hardware.

pub mod microphone;
pub mod wav;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::oneshot;

use quill_core::error::CycleError;

pub use microphone::{MicrophoneRecorder, RecorderConfig};

// =============================================================================
// Format and artifact
// =============================================================================

/// Fixed recording format handed to the transcription process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl AudioFormat {
    /// Mono, 16-bit signed linear PCM, 16 kHz.
    pub const SPEECH: AudioFormat = AudioFormat {
        sample_rate: 16_000,
        channels: 1,
        bits_per_sample: 16,
    };
}

/// A finished recording on disk.
///
/// Exclusively owned by the pipeline: it cannot be cloned, and dropping it
/// deletes the file, so the artifact never outlives the cycle that made it.
#[derive(Debug)]
pub struct AudioArtifact {
    path: PathBuf,
    format: AudioFormat,
    duration_ms: u64,
}

impl AudioArtifact {
    pub fn new(path: PathBuf, format: AudioFormat, duration_ms: u64) -> Self {
        Self {
            path,
            format,
            duration_ms,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Delete the file now. Equivalent to dropping the artifact.
    pub fn discard(self) {
        drop(self);
    }
}

impl Drop for AudioArtifact {
    fn drop(&mut self) {
        // Cleanup is not user-visible; failures are only logged.
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Audio artifact deleted"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "Audio artifact cleanup failed")
            }
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Errors from starting or finishing a recording.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Audio device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("Recording stream failed: {0}")]
    Stream(String),
    #[error("Recording contained no audio")]
    NoAudio,
    #[error("A recording is already in progress")]
    AlreadyRecording,
    #[error("No recording in progress")]
    NotRecording,
    #[error("WAV encoding failed: {0}")]
    Encoding(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CaptureError> for CycleError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::NoAudio => CycleError::NoAudio,
            other => CycleError::Capture(other.to_string()),
        }
    }
}

impl From<hound::Error> for CaptureError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => CaptureError::Io(e),
            other => CaptureError::Encoding(other.to_string()),
        }
    }
}

// =============================================================================
// Completion signal
// =============================================================================

/// Pending result of a stopped recording.
///
/// `stop()` returns one of these immediately; the artifact only exists once
/// the recorder has flushed and closed the file and resolved the completion.
#[derive(Debug)]
pub struct CaptureCompletion {
    rx: oneshot::Receiver<Result<AudioArtifact, CaptureError>>,
}

/// Sending half of a `CaptureCompletion`, held by the recorder.
pub type CompletionSender = oneshot::Sender<Result<AudioArtifact, CaptureError>>;

impl CaptureCompletion {
    /// Create a completion and the sender that resolves it.
    pub fn pending() -> (CompletionSender, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    /// Create an already-resolved completion.
    pub fn ready(result: Result<AudioArtifact, CaptureError>) -> Self {
        let (tx, completion) = Self::pending();
        // The receiver is alive, so this cannot fail.
        let _ = tx.send(result);
        completion
    }

    /// Wait for the recorder to finish.
    pub async fn wait(self) -> Result<AudioArtifact, CaptureError> {
        self.rx.await.unwrap_or_else(|_| {
            Err(CaptureError::Stream(
                "recorder exited without signalling completion".to_string(),
            ))
        })
    }
}

// =============================================================================
// Trait
// =============================================================================

/// A microphone recording session.
///
/// At most one recording is active at a time per service.
pub trait AudioCaptureService: Send + Sync {
    /// Begin recording to a fresh artifact location, overwriting any stale file.
    fn start(&self) -> impl Future<Output = Result<(), CaptureError>> + Send;

    /// Signal end of recording. Returns immediately; await the completion
    /// for the finished artifact.
    fn stop(&self) -> Result<CaptureCompletion, CaptureError>;

    /// Check whether a recording is currently active.
    fn is_active(&self) -> bool;
}

// =============================================================================
// Mock implementation
// =============================================================================

/// How the mock's next `stop()` resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockStopOutcome {
    /// Write a silent WAV of the given length.
    Silence { duration_ms: u64 },
    /// Resolve with `CaptureError::NoAudio`.
    Empty,
    /// Resolve with a stream failure.
    Fail,
}

/// Mock audio capture service for testing.
///
/// Writes a real (silent) WAV file to `artifact_path` on stop so downstream
/// stages operate on an actual file. Counts starts so tests can assert that
/// no concurrent capture ever began.
#[derive(Debug, Clone)]
pub struct MockAudioCapture {
    artifact_path: PathBuf,
    active: Arc<AtomicBool>,
    starts: Arc<AtomicUsize>,
    fail_start: bool,
    outcome: MockStopOutcome,
    finish_delay: Duration,
}

impl MockAudioCapture {
    pub fn new(artifact_path: impl Into<PathBuf>) -> Self {
        Self {
            artifact_path: artifact_path.into(),
            active: Arc::new(AtomicBool::new(false)),
            starts: Arc::new(AtomicUsize::new(0)),
            fail_start: false,
            outcome: MockStopOutcome::Silence { duration_ms: 2_000 },
            finish_delay: Duration::ZERO,
        }
    }

    /// Make `start()` fail as if no input device were present.
    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn with_outcome(mut self, outcome: MockStopOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// Delay the completion signal, to simulate the recorder flushing.
    pub fn with_finish_delay(mut self, delay: Duration) -> Self {
        self.finish_delay = delay;
        self
    }

    /// Number of successful `start()` calls.
    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    fn finish(path: PathBuf, outcome: MockStopOutcome) -> Result<AudioArtifact, CaptureError> {
        match outcome {
            MockStopOutcome::Silence { duration_ms } => {
                let samples =
                    vec![0.0f32; (AudioFormat::SPEECH.sample_rate as u64 * duration_ms / 1000) as usize];
                wav::write_speech_wav(&path, &samples)
            }
            MockStopOutcome::Empty => Err(CaptureError::NoAudio),
            MockStopOutcome::Fail => Err(CaptureError::Stream("mock stream failure".to_string())),
        }
    }
}

impl AudioCaptureService for MockAudioCapture {
    async fn start(&self) -> Result<(), CaptureError> {
        if self.fail_start {
            return Err(CaptureError::DeviceUnavailable(
                "mock device unavailable".to_string(),
            ));
        }
        if self.active.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::AlreadyRecording);
        }
        self.starts.fetch_add(1, Ordering::SeqCst);
        tracing::info!("Mock audio capture started");
        Ok(())
    }

    fn stop(&self) -> Result<CaptureCompletion, CaptureError> {
        if !self.active.swap(false, Ordering::SeqCst) {
            return Err(CaptureError::NotRecording);
        }
        tracing::info!("Mock audio capture stopped");

        let path = self.artifact_path.clone();
        let outcome = self.outcome;
        if self.finish_delay.is_zero() {
            return Ok(CaptureCompletion::ready(Self::finish(path, outcome)));
        }

        let (tx, completion) = CaptureCompletion::pending();
        let delay = self.finish_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Self::finish(path, outcome));
        });
        Ok(completion)
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

// =============================================================================
// Tests
// =============================================================================
