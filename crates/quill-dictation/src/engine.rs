//! Dictation controller driving capture, transcription and injection.
//!
//! The controller runs as a single tokio task that owns the state machine
//! and consumes [`DictationCommand`]s. A toggle-off hands the capture
//! completion to a spawned pipeline task (await capture, transcribe, paste);
//! the controller selects between new commands and that task, so at most one
//! pipeline exists at a time and the state only returns to `Idle` once it
//! has finished.
//!
//! Callers hold a [`DictationHandle`]: commands go in over an mpsc channel,
//! [`DictationEvent`]s come out on a broadcast channel, and the current
//! [`DictationState`] is readable through a `watch` channel.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use uuid::Uuid;

use quill_audio::{AudioCaptureService, CaptureCompletion};
use quill_core::config::DictationConfig;
use quill_core::error::{CycleError, QuillError};
use quill_core::events::DictationEvent;
use quill_core::types::{PendingTogglePolicy, Timestamp};
use quill_whisper::TranscriptionInvoker;

use crate::permissions::PermissionGate;
use crate::state::{DictationState, StateMachine};
use crate::text_inject::ClipboardInjector;

const COMMAND_CAPACITY: usize = 32;
const EVENT_CAPACITY: usize = 64;

/// Input to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictationCommand {
    /// Menu-style toggle: start when idle, stop when recording.
    Toggle,
    /// Dictation key went down. Starts a recording when idle.
    HotkeyPressed,
    /// Dictation key came up. Stops the recording.
    HotkeyReleased,
    /// Stop any recording, let an in-flight pipeline finish, then exit.
    Shutdown,
}

/// Controller policy knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    pub pending_toggle: PendingTogglePolicy,
    /// Paste a placeholder such as "(no speech detected)" when a cycle
    /// produces no transcript.
    pub inject_placeholders: bool,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            pending_toggle: PendingTogglePolicy::Queue,
            inject_placeholders: true,
        }
    }
}

impl From<&DictationConfig> for ControllerSettings {
    fn from(config: &DictationConfig) -> Self {
        Self {
            pending_toggle: config.pending_toggle,
            inject_placeholders: config.inject_placeholders,
        }
    }
}

/// Tracks one toggle cycle from toggle-on to completion.
#[derive(Debug, Clone)]
pub struct DictationSession {
    /// Unique identifier for this session.
    pub id: Uuid,
    /// When recording started.
    pub start_time: DateTime<Utc>,
}

impl DictationSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            start_time: Utc::now(),
        }
    }

    /// Milliseconds since recording started.
    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.start_time).num_milliseconds()
    }
}

impl Default for DictationSession {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Controller
// =============================================================================

/// Owns the pipeline collaborators until [`spawn`](Self::spawn) moves them
/// into the controller task.
pub struct DictationController<A, T> {
    capture: Arc<A>,
    transcriber: Arc<T>,
    injector: Arc<ClipboardInjector>,
    permissions: Arc<dyn PermissionGate>,
    settings: ControllerSettings,
}

impl<A, T> DictationController<A, T>
where
    A: AudioCaptureService + 'static,
    T: TranscriptionInvoker + 'static,
{
    pub fn new(
        capture: A,
        transcriber: T,
        injector: ClipboardInjector,
        permissions: impl PermissionGate + 'static,
        settings: ControllerSettings,
    ) -> Self {
        Self {
            capture: Arc::new(capture),
            transcriber: Arc::new(transcriber),
            injector: Arc::new(injector),
            permissions: Arc::new(permissions),
            settings,
        }
    }

    /// Start the controller task. Must be called inside a tokio runtime.
    pub fn spawn(self) -> DictationHandle {
        let (commands, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let machine = StateMachine::new();
        let state = machine.subscribe();

        let actor = ControllerActor {
            capture: self.capture,
            transcriber: self.transcriber,
            injector: self.injector,
            permissions: self.permissions,
            settings: self.settings,
            machine,
            events: events.clone(),
            recording: None,
            pipeline: None,
            pending: None,
        };
        let task = tokio::spawn(actor.run(command_rx));

        DictationHandle {
            commands,
            events,
            state,
            task,
        }
    }
}

/// Client side of a running controller.
pub struct DictationHandle {
    commands: mpsc::Sender<DictationCommand>,
    events: broadcast::Sender<DictationEvent>,
    state: watch::Receiver<DictationState>,
    task: JoinHandle<()>,
}

impl DictationHandle {
    pub async fn send(&self, command: DictationCommand) -> Result<(), QuillError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| QuillError::ShuttingDown)
    }

    pub async fn toggle(&self) -> Result<(), QuillError> {
        self.send(DictationCommand::Toggle).await
    }

    pub async fn press(&self) -> Result<(), QuillError> {
        self.send(DictationCommand::HotkeyPressed).await
    }

    pub async fn release(&self) -> Result<(), QuillError> {
        self.send(DictationCommand::HotkeyReleased).await
    }

    /// A sender for other tasks or threads (e.g. the hotkey poller).
    pub fn commands(&self) -> mpsc::Sender<DictationCommand> {
        self.commands.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DictationEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> DictationState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<DictationState> {
        self.state.clone()
    }

    /// Ask the controller to stop and wait until it has.
    pub async fn shutdown(self) -> Result<(), QuillError> {
        // A closed channel means the task is already on its way out.
        let _ = self.commands.send(DictationCommand::Shutdown).await;
        self.task
            .await
            .map_err(|e| QuillError::Dictation(format!("Controller task failed: {}", e)))
    }
}

// =============================================================================
// Actor
// =============================================================================

enum CycleOutcome {
    Inserted { char_count: usize },
    Failed {
        error: CycleError,
        placeholder: Option<String>,
    },
}

struct InFlight {
    session: DictationSession,
    handle: JoinHandle<CycleOutcome>,
}

struct PendingStart {
    /// Queued by a key press, so the matching release cancels it.
    from_hotkey: bool,
}

struct ControllerActor<A, T> {
    capture: Arc<A>,
    transcriber: Arc<T>,
    injector: Arc<ClipboardInjector>,
    permissions: Arc<dyn PermissionGate>,
    settings: ControllerSettings,
    machine: StateMachine,
    events: broadcast::Sender<DictationEvent>,
    recording: Option<DictationSession>,
    pipeline: Option<InFlight>,
    pending: Option<PendingStart>,
}

impl<A, T> ControllerActor<A, T>
where
    A: AudioCaptureService + 'static,
    T: TranscriptionInvoker + 'static,
{
    async fn run(mut self, mut commands: mpsc::Receiver<DictationCommand>) {
        tracing::info!(
            pending_toggle = ?self.settings.pending_toggle,
            inject_placeholders = self.settings.inject_placeholders,
            "Dictation controller started"
        );

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(DictationCommand::Shutdown) | None => break,
                    Some(command) => self.handle(command).await,
                },
                joined = join_pipeline(&mut self.pipeline) => {
                    self.finish_cycle(joined);
                    self.replay_pending().await;
                }
            }
        }

        self.shutdown().await;
    }

    async fn handle(&mut self, command: DictationCommand) {
        use DictationCommand::*;
        use DictationState::*;

        let state = self.machine.current();
        tracing::debug!(?command, %state, "Dictation command");

        match (command, state) {
            (Toggle | HotkeyPressed, Idle) => self.start_recording().await,
            (Toggle | HotkeyReleased, Recording) => self.stop_recording(),
            (Toggle, Processing) => self.defer_start(false),
            (HotkeyPressed, Processing) => self.defer_start(true),
            (HotkeyReleased, Processing) => self.cancel_hotkey_start(),
            (command, state) => {
                tracing::debug!(?command, %state, "Command has no effect in this state")
            }
        }
    }

    async fn start_recording(&mut self) {
        if let Err(error) = self.permissions.check() {
            tracing::warn!(error = %error, "Dictation blocked by missing permission");
            self.report_failure(None, &error);
            return;
        }

        if let Err(e) = self.capture.start().await {
            let error = CycleError::from(e);
            tracing::warn!(error = %error, "Audio capture failed to start");
            self.report_failure(None, &error);
            return;
        }

        let session = DictationSession::new();
        self.set_state(DictationState::Recording);
        tracing::info!(session_id = %session.id, "Dictation session started");
        self.emit(DictationEvent::ListeningChanged {
            listening: true,
            timestamp: Timestamp::now(),
        });
        self.emit(DictationEvent::CycleStarted {
            session_id: session.id,
            timestamp: Timestamp::now(),
        });
        self.recording = Some(session);
    }

    fn stop_recording(&mut self) {
        let session = self.recording.take().unwrap_or_default();

        match self.capture.stop() {
            Ok(completion) => {
                self.set_state(DictationState::Processing);
                self.emit(DictationEvent::ListeningChanged {
                    listening: false,
                    timestamp: Timestamp::now(),
                });
                tracing::info!(
                    session_id = %session.id,
                    recorded_ms = session.elapsed_ms(),
                    "Recording stopped, processing"
                );

                let handle = tokio::spawn(run_pipeline(
                    completion,
                    self.transcriber.clone(),
                    self.injector.clone(),
                    self.settings.inject_placeholders,
                ));
                self.pipeline = Some(InFlight { session, handle });
            }
            Err(e) => {
                let error = CycleError::from(e);
                self.set_state(DictationState::Idle);
                self.emit(DictationEvent::ListeningChanged {
                    listening: false,
                    timestamp: Timestamp::now(),
                });
                self.report_failure(Some(session.id), &error);
            }
        }
    }

    /// A start request arrived while processing.
    fn defer_start(&mut self, from_hotkey: bool) {
        match self.settings.pending_toggle {
            PendingTogglePolicy::Queue => match self.pending.as_mut() {
                Some(pending) => {
                    // Collapse; a menu request outlives the key's release.
                    pending.from_hotkey &= from_hotkey;
                    tracing::debug!("Start already queued; request collapsed");
                }
                None => {
                    self.pending = Some(PendingStart { from_hotkey });
                    tracing::info!("Start queued until processing completes");
                    self.emit(DictationEvent::ToggleQueued {
                        timestamp: Timestamp::now(),
                    });
                }
            },
            PendingTogglePolicy::Drop => {
                tracing::info!("Start request dropped while processing");
                self.emit(DictationEvent::ToggleDiscarded {
                    reason: "busy processing the previous dictation".to_string(),
                    timestamp: Timestamp::now(),
                });
            }
        }
    }

    fn cancel_hotkey_start(&mut self) {
        if self.pending.as_ref().is_some_and(|p| p.from_hotkey) {
            self.pending = None;
            tracing::info!("Queued start cancelled by key release");
            self.emit(DictationEvent::ToggleDiscarded {
                reason: "key released before processing finished".to_string(),
                timestamp: Timestamp::now(),
            });
        }
    }

    async fn replay_pending(&mut self) {
        if self.pending.take().is_some() && self.machine.current() == DictationState::Idle {
            tracing::info!("Replaying queued start");
            self.start_recording().await;
        }
    }

    fn finish_cycle(&mut self, joined: Result<CycleOutcome, JoinError>) {
        let session = self
            .pipeline
            .take()
            .map(|in_flight| in_flight.session)
            .unwrap_or_default();
        self.set_state(DictationState::Idle);

        match joined {
            Ok(CycleOutcome::Inserted { char_count }) => {
                let duration_ms = session.elapsed_ms();
                tracing::info!(
                    session_id = %session.id,
                    char_count,
                    duration_ms,
                    "Dictation complete"
                );
                self.emit(DictationEvent::TextInserted {
                    session_id: session.id,
                    char_count,
                    duration_ms,
                    timestamp: Timestamp::now(),
                });
            }
            Ok(CycleOutcome::Failed { error, placeholder }) => {
                if let Some(text) = placeholder {
                    self.emit(DictationEvent::PlaceholderInserted {
                        session_id: session.id,
                        text,
                        timestamp: Timestamp::now(),
                    });
                }
                self.report_failure(Some(session.id), &error);
            }
            Err(e) => {
                tracing::error!(session_id = %session.id, error = %e, "Dictation pipeline aborted");
                self.emit(DictationEvent::CycleFailed {
                    session_id: Some(session.id),
                    kind: "pipeline_aborted".to_string(),
                    status: "dictation stopped unexpectedly".to_string(),
                    timestamp: Timestamp::now(),
                });
            }
        }
    }

    async fn shutdown(&mut self) {
        self.pending = None;

        match self.machine.current() {
            DictationState::Recording => {
                let session = self.recording.take().unwrap_or_default();
                tracing::info!(session_id = %session.id, "Stopping active recording for shutdown");
                match self.capture.stop() {
                    Ok(completion) => {
                        if let Ok(artifact) = completion.wait().await {
                            artifact.discard();
                        }
                    }
                    Err(e) => tracing::debug!(error = %e, "Recorder already stopped"),
                }
                self.set_state(DictationState::Idle);
                self.emit(DictationEvent::ListeningChanged {
                    listening: false,
                    timestamp: Timestamp::now(),
                });
            }
            DictationState::Processing => {
                tracing::info!("Waiting for in-flight dictation before shutdown");
                let joined = join_pipeline(&mut self.pipeline).await;
                self.finish_cycle(joined);
            }
            DictationState::Idle => {}
        }

        tracing::info!("Dictation controller stopped");
        self.emit(DictationEvent::ControllerStopped {
            timestamp: Timestamp::now(),
        });
    }

    fn report_failure(&self, session_id: Option<Uuid>, error: &CycleError) {
        tracing::warn!(
            session_id = ?session_id,
            kind = error.kind(),
            error = %error,
            "Dictation cycle failed"
        );
        if let CycleError::MissingDependency { output, .. } = error {
            tracing::debug!(output = %output, "Transcription process output");
        }
        if let CycleError::TranscriptionFailed { output } = error {
            tracing::debug!(output = %output, "Transcription process output");
        }

        self.emit(DictationEvent::CycleFailed {
            session_id,
            kind: error.kind().to_string(),
            status: error.status_text(),
            timestamp: Timestamp::now(),
        });

        if let CycleError::MissingDependency { tool, .. } = error {
            self.emit(DictationEvent::RemediationNotice {
                tool: tool.clone(),
                message: error.status_text(),
                timestamp: Timestamp::now(),
            });
        }
    }

    fn set_state(&self, target: DictationState) {
        if let Err(e) = self.machine.transition(target) {
            tracing::error!(error = %e, "Unexpected dictation state transition");
            if target == DictationState::Idle {
                self.machine.reset();
            }
        }
    }

    fn emit(&self, event: DictationEvent) {
        tracing::debug!(event = event.event_name(), "Dictation event");
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }
}

/// Resolves when the in-flight pipeline finishes; pending forever if none.
async fn join_pipeline(pipeline: &mut Option<InFlight>) -> Result<CycleOutcome, JoinError> {
    match pipeline.as_mut() {
        Some(in_flight) => (&mut in_flight.handle).await,
        None => std::future::pending().await,
    }
}

// =============================================================================
// Pipeline
// =============================================================================

async fn run_pipeline<T>(
    completion: CaptureCompletion,
    transcriber: Arc<T>,
    injector: Arc<ClipboardInjector>,
    inject_placeholders: bool,
) -> CycleOutcome
where
    T: TranscriptionInvoker + 'static,
{
    match transcribe_and_insert(completion, transcriber.as_ref(), &injector).await {
        Ok(char_count) => CycleOutcome::Inserted { char_count },
        Err(error) => {
            let placeholder = match error.placeholder() {
                Some(text) if inject_placeholders => {
                    match injector.clone().deliver(text.clone()).await {
                        Ok(()) => Some(text),
                        Err(e) => {
                            tracing::warn!(error = %e, "Placeholder could not be inserted");
                            None
                        }
                    }
                }
                _ => None,
            };
            CycleOutcome::Failed { error, placeholder }
        }
    }
}

/// Capture, then transcription, then injection; each stage starts only once
/// the previous one has a result.
async fn transcribe_and_insert<T: TranscriptionInvoker>(
    completion: CaptureCompletion,
    transcriber: &T,
    injector: &Arc<ClipboardInjector>,
) -> Result<usize, CycleError> {
    let artifact = completion.wait().await?;
    tracing::debug!(
        path = %artifact.path().display(),
        audio_ms = artifact.duration_ms(),
        "Capture complete"
    );

    let text = transcriber.transcribe(artifact).await.into_cycle_result()?;
    let char_count = text.chars().count();

    injector.clone().deliver(text).await?;
    Ok(char_count)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::{AlwaysGranted, StaticPermissions};
    use crate::text_inject::{InjectTimings, MemoryClipboard, RecordingPaste};
    use quill_audio::MockAudioCapture;
    use quill_core::types::Permission;
    use quill_whisper::MockTranscriber;
    use std::time::Duration;

    fn injector(clipboard: &MemoryClipboard) -> (ClipboardInjector, RecordingPaste) {
        let paste = RecordingPaste::observing(clipboard.clone());
        (
            ClipboardInjector::new(clipboard.clone(), paste.clone(), InjectTimings::immediate()),
            paste,
        )
    }

    async fn next_event(rx: &mut broadcast::Receiver<DictationEvent>) -> DictationEvent {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event channel closed")
    }

    #[test]
    fn test_settings_from_config() {
        let config = DictationConfig {
            pending_toggle: PendingTogglePolicy::Drop,
            inject_placeholders: false,
            ..DictationConfig::default()
        };
        let settings = ControllerSettings::from(&config);
        assert_eq!(settings.pending_toggle, PendingTogglePolicy::Drop);
        assert!(!settings.inject_placeholders);
        assert_eq!(
            ControllerSettings::from(&DictationConfig::default()),
            ControllerSettings::default()
        );
    }

    #[test]
    fn test_session_elapsed() {
        let session = DictationSession::new();
        assert!(session.elapsed_ms() >= 0);
        assert_ne!(session.id, DictationSession::new().id);
    }

    #[tokio::test]
    async fn test_toggle_cycle_inserts_text() {
        let dir = tempfile::tempdir().unwrap();
        let clipboard = MemoryClipboard::with_text("mine");
        let (injector, paste) = injector(&clipboard);
        let handle = DictationController::new(
            MockAudioCapture::new(dir.path().join("recording.wav")),
            MockTranscriber::text("hello"),
            injector,
            AlwaysGranted,
            ControllerSettings::default(),
        )
        .spawn();
        let mut events = handle.subscribe();

        handle.toggle().await.unwrap();
        assert!(matches!(
            next_event(&mut events).await,
            DictationEvent::ListeningChanged { listening: true, .. }
        ));
        assert!(matches!(
            next_event(&mut events).await,
            DictationEvent::CycleStarted { .. }
        ));
        assert_eq!(handle.state(), DictationState::Recording);

        handle.toggle().await.unwrap();
        assert!(matches!(
            next_event(&mut events).await,
            DictationEvent::ListeningChanged { listening: false, .. }
        ));
        match next_event(&mut events).await {
            DictationEvent::TextInserted { char_count, .. } => assert_eq!(char_count, 5),
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(handle.state(), DictationState::Idle);
        assert_eq!(paste.pasted(), vec!["hello"]);
        assert_eq!(clipboard.contents().as_deref(), Some("mine"));

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_permission_denied_stays_idle() {
        let dir = tempfile::tempdir().unwrap();
        let capture = MockAudioCapture::new(dir.path().join("recording.wav"));
        let (injector, _paste) = injector(&MemoryClipboard::new());
        let permissions = StaticPermissions::new(true, false);
        let handle = DictationController::new(
            capture.clone(),
            MockTranscriber::text("unused"),
            injector,
            permissions.clone(),
            ControllerSettings::default(),
        )
        .spawn();
        let mut events = handle.subscribe();

        handle.toggle().await.unwrap();
        match next_event(&mut events).await {
            DictationEvent::CycleFailed {
                session_id, kind, ..
            } => {
                assert_eq!(session_id, None);
                assert_eq!(kind, CycleError::PermissionDenied(Permission::InputInjection).kind());
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(handle.state(), DictationState::Idle);
        assert_eq!(capture.start_count(), 0);

        permissions.set_input_injection(true);
        handle.toggle().await.unwrap();
        assert!(matches!(
            next_event(&mut events).await,
            DictationEvent::ListeningChanged { listening: true, .. }
        ));
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_capture_start_failure_stays_idle() {
        let dir = tempfile::tempdir().unwrap();
        let (injector, _paste) = injector(&MemoryClipboard::new());
        let handle = DictationController::new(
            MockAudioCapture::new(dir.path().join("recording.wav")).failing_start(),
            MockTranscriber::text("unused"),
            injector,
            AlwaysGranted,
            ControllerSettings::default(),
        )
        .spawn();
        let mut events = handle.subscribe();

        handle.press().await.unwrap();
        match next_event(&mut events).await {
            DictationEvent::CycleFailed { kind, .. } => assert_eq!(kind, "capture_error"),
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(handle.state(), DictationState::Idle);
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_release_when_idle_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let capture = MockAudioCapture::new(dir.path().join("recording.wav"));
        let (injector, _paste) = injector(&MemoryClipboard::new());
        let handle = DictationController::new(
            capture.clone(),
            MockTranscriber::text("unused"),
            injector,
            AlwaysGranted,
            ControllerSettings::default(),
        )
        .spawn();
        let mut events = handle.subscribe();

        handle.release().await.unwrap();
        handle.shutdown().await.unwrap();

        assert!(matches!(
            next_event(&mut events).await,
            DictationEvent::ControllerStopped { .. }
        ));
        assert_eq!(capture.start_count(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_discards_active_recording() {
        let dir = tempfile::tempdir().unwrap();
        let capture = MockAudioCapture::new(dir.path().join("recording.wav"));
        let transcriber = MockTranscriber::text("never");
        let (injector, paste) = injector(&MemoryClipboard::new());
        let handle = DictationController::new(
            capture.clone(),
            transcriber.clone(),
            injector,
            AlwaysGranted,
            ControllerSettings::default(),
        )
        .spawn();
        let mut state = handle.watch_state();

        handle.press().await.unwrap();
        state
            .wait_for(|s| *s == DictationState::Recording)
            .await
            .unwrap();
        handle.shutdown().await.unwrap();

        assert!(!capture.is_active());
        assert!(!capture.artifact_path().exists());
        assert_eq!(transcriber.calls(), 0);
        assert_eq!(paste.count(), 0);
        assert_eq!(*state.borrow(), DictationState::Idle);
    }

    #[tokio::test]
    async fn test_commands_after_shutdown_fail() {
        let dir = tempfile::tempdir().unwrap();
        let (injector, _paste) = injector(&MemoryClipboard::new());
        let handle = DictationController::new(
            MockAudioCapture::new(dir.path().join("recording.wav")),
            MockTranscriber::text("unused"),
            injector,
            AlwaysGranted,
            ControllerSettings::default(),
        )
        .spawn();
        let sender = handle.commands();
        handle.shutdown().await.unwrap();
        assert!(sender.send(DictationCommand::Toggle).await.is_err());
    }
}
