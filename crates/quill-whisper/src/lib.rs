//! Quill Whisper crate - speech-to-text via an external transcription process.
//!
//! Provides a trait-based abstraction over "audio file in, text out"
//! transcription, the tagged result type consumed by the dictation
//! controller, the process-backed implementation, and a mock for testing.

pub mod process;

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use quill_audio::AudioArtifact;
use quill_core::error::CycleError;

pub use process::{WhisperConfig, WhisperProcess};

// =============================================================================
// Result types
// =============================================================================

/// Why a transcription run failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The process output named a missing helper tool, or the program itself
    /// could not be launched.
    MissingDependency { tool: String },
    /// The process failed for any other reason (nonzero exit, timeout).
    TranscriptionError,
    /// The process succeeded but its transcript file could not be read.
    OutputUnreadable,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::MissingDependency { tool } => write!(f, "missing-dependency ({})", tool),
            FailureReason::TranscriptionError => write!(f, "transcription-error"),
            FailureReason::OutputUnreadable => write!(f, "output-unreadable"),
        }
    }
}

/// Outcome of transcribing one audio artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptionResult {
    /// Non-empty, whitespace-trimmed transcript.
    Text(String),
    /// The process succeeded but heard nothing.
    Empty,
    /// The process failed; `raw_output` is its combined stdout and stderr.
    ProcessFailure {
        reason: FailureReason,
        raw_output: String,
    },
}

impl TranscriptionResult {
    /// Build a result from raw transcript text.
    pub fn from_transcript(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            TranscriptionResult::Empty
        } else {
            TranscriptionResult::Text(trimmed.to_string())
        }
    }

    /// Collapse into the controller's cycle outcome.
    pub fn into_cycle_result(self) -> Result<String, CycleError> {
        match self {
            TranscriptionResult::Text(text) => Ok(text),
            TranscriptionResult::Empty => Err(CycleError::EmptyTranscription),
            TranscriptionResult::ProcessFailure {
                reason: FailureReason::MissingDependency { tool },
                raw_output,
            } => Err(CycleError::MissingDependency {
                tool,
                output: raw_output,
            }),
            TranscriptionResult::ProcessFailure { raw_output, .. } => {
                Err(CycleError::TranscriptionFailed { output: raw_output })
            }
        }
    }
}

// =============================================================================
// Trait
// =============================================================================

/// Runs speech recognition over a finished recording.
///
/// Implementations take ownership of the artifact and must delete it before
/// returning, whatever the outcome.
pub trait TranscriptionInvoker: Send + Sync {
    fn transcribe(
        &self,
        artifact: AudioArtifact,
    ) -> impl Future<Output = TranscriptionResult> + Send;
}

// =============================================================================
// Mock implementation
// =============================================================================

/// Mock transcriber returning a fixed result.
///
/// Records how many calls ran and the highest number that overlapped, so
/// tests can assert the pipeline never transcribes two artifacts at once.
#[derive(Debug, Clone)]
pub struct MockTranscriber {
    result: TranscriptionResult,
    delay: Duration,
    calls: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    artifact_seen: Arc<AtomicUsize>,
}

impl MockTranscriber {
    pub fn new(result: TranscriptionResult) -> Self {
        Self {
            result,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            artifact_seen: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn text(text: &str) -> Self {
        Self::new(TranscriptionResult::from_transcript(text))
    }

    pub fn failure(reason: FailureReason, raw_output: &str) -> Self {
        Self::new(TranscriptionResult::ProcessFailure {
            reason,
            raw_output: raw_output.to_string(),
        })
    }

    /// Simulate a slow recognizer.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Number of calls whose artifact file existed on disk when received.
    pub fn artifacts_seen(&self) -> usize {
        self.artifact_seen.load(Ordering::SeqCst)
    }
}

impl TranscriptionInvoker for MockTranscriber {
    async fn transcribe(&self, artifact: AudioArtifact) -> TranscriptionResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if artifact.path().exists() {
            self.artifact_seen.fetch_add(1, Ordering::SeqCst);
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        tracing::debug!(path = %artifact.path().display(), "Mock transcription");
        artifact.discard();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.result.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================
