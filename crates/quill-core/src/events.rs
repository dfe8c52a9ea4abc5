use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Timestamp;

/// Everything the dictation controller reports upward.
///
/// Events are broadcast to:
/// - The presentation layer (status icon, alerts)
/// - The application log
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DictationEvent {
    /// The UI-visible listening indicator changed.
    ListeningChanged {
        listening: bool,
        timestamp: Timestamp,
    },

    /// A cycle began recording.
    CycleStarted {
        session_id: Uuid,
        timestamp: Timestamp,
    },

    /// Transcribed text was pasted into the focused application.
    TextInserted {
        session_id: Uuid,
        char_count: usize,
        duration_ms: i64,
        timestamp: Timestamp,
    },

    /// A placeholder was pasted instead of a transcript.
    PlaceholderInserted {
        session_id: Uuid,
        text: String,
        timestamp: Timestamp,
    },

    /// The cycle ended without inserting a transcript.
    CycleFailed {
        session_id: Option<Uuid>,
        kind: String,
        status: String,
        timestamp: Timestamp,
    },

    /// A required external tool is missing; shown as an alert.
    RemediationNotice {
        tool: String,
        message: String,
        timestamp: Timestamp,
    },

    /// A start request arrived while processing and will be replayed.
    ToggleQueued { timestamp: Timestamp },

    /// A start request arrived while processing and was dropped.
    ToggleDiscarded { reason: String, timestamp: Timestamp },

    /// The controller shut down.
    ControllerStopped { timestamp: Timestamp },
}

impl DictationEvent {
    /// Returns the timestamp of the event.
    pub fn timestamp(&self) -> Timestamp {
        match self {
            DictationEvent::ListeningChanged { timestamp, .. }
            | DictationEvent::CycleStarted { timestamp, .. }
            | DictationEvent::TextInserted { timestamp, .. }
            | DictationEvent::PlaceholderInserted { timestamp, .. }
            | DictationEvent::CycleFailed { timestamp, .. }
            | DictationEvent::RemediationNotice { timestamp, .. }
            | DictationEvent::ToggleQueued { timestamp }
            | DictationEvent::ToggleDiscarded { timestamp, .. }
            | DictationEvent::ControllerStopped { timestamp } => *timestamp,
        }
    }

    /// Returns a human-readable event name for logging.
    pub fn event_name(&self) -> &'static str {
        match self {
            DictationEvent::ListeningChanged { .. } => "listening_changed",
            DictationEvent::CycleStarted { .. } => "cycle_started",
            DictationEvent::TextInserted { .. } => "text_inserted",
            DictationEvent::PlaceholderInserted { .. } => "placeholder_inserted",
            DictationEvent::CycleFailed { .. } => "cycle_failed",
            DictationEvent::RemediationNotice { .. } => "remediation_notice",
            DictationEvent::ToggleQueued { .. } => "toggle_queued",
            DictationEvent::ToggleDiscarded { .. } => "toggle_discarded",
            DictationEvent::ControllerStopped { .. } => "controller_stopped",
        }
    }
}
