//! Dictation state machine with validated transitions.
//!
//! Valid transitions for one toggle cycle:
//! - Idle -> Recording (toggle on)
//! - Recording -> Processing (toggle off, capture handed to the pipeline)
//! - Processing -> Idle (pipeline finished, whatever the outcome)
//! - Recording -> Idle (capture could not be stopped, or forced stop on shutdown)
//!
//! The current state is published on a `watch` channel so observers never
//! touch the controller's state directly.

use std::fmt;

use quill_core::error::QuillError;
use tokio::sync::watch;

/// Operational state of the dictation controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DictationState {
    /// No cycle in progress. Ready to start.
    Idle,
    /// The microphone is recording.
    Recording,
    /// Transcribing and injecting the last recording.
    Processing,
}

impl fmt::Display for DictationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictationState::Idle => write!(f, "Idle"),
            DictationState::Recording => write!(f, "Recording"),
            DictationState::Processing => write!(f, "Processing"),
        }
    }
}

impl DictationState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &DictationState) -> bool {
        matches!(
            (self, target),
            (DictationState::Idle, DictationState::Recording)
                | (DictationState::Recording, DictationState::Processing)
                | (DictationState::Processing, DictationState::Idle)
                | (DictationState::Recording, DictationState::Idle)
        )
    }

    /// Whether the UI listening indicator should be lit.
    pub fn is_listening(&self) -> bool {
        matches!(self, DictationState::Recording)
    }
}

/// State machine owned by the controller task.
///
/// All transitions are validated before being applied. Every applied
/// transition is published to `watch` subscribers.
#[derive(Debug)]
pub struct StateMachine {
    tx: watch::Sender<DictationState>,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// Create a new state machine initialized to `Idle`.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(DictationState::Idle);
        Self { tx }
    }

    /// Returns the current state.
    pub fn current(&self) -> DictationState {
        *self.tx.borrow()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<DictationState> {
        self.tx.subscribe()
    }

    /// Attempt to transition to the target state.
    ///
    /// Returns `QuillError::Dictation` if the transition is not allowed from
    /// the current state; the state is left unchanged in that case.
    pub fn transition(&self, target: DictationState) -> Result<(), QuillError> {
        let current = self.current();
        if current.can_transition_to(&target) {
            tracing::debug!("Dictation state: {} -> {}", current, target);
            self.tx.send_replace(target);
            Ok(())
        } else {
            Err(QuillError::Dictation(format!(
                "Invalid state transition: {} -> {}",
                current, target
            )))
        }
    }

    /// Force the state machine back to Idle (used for error recovery).
    pub fn reset(&self) {
        let previous = self.tx.send_replace(DictationState::Idle);
        tracing::warn!("Dictation state machine reset to Idle from {}", previous);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(DictationState::Idle.to_string(), "Idle");
        assert_eq!(DictationState::Recording.to_string(), "Recording");
        assert_eq!(DictationState::Processing.to_string(), "Processing");
    }

    #[test]
    fn test_valid_transitions() {
        assert!(DictationState::Idle.can_transition_to(&DictationState::Recording));
        assert!(DictationState::Recording.can_transition_to(&DictationState::Processing));
        assert!(DictationState::Processing.can_transition_to(&DictationState::Idle));
        assert!(DictationState::Recording.can_transition_to(&DictationState::Idle));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!DictationState::Idle.can_transition_to(&DictationState::Processing));
        assert!(!DictationState::Processing.can_transition_to(&DictationState::Recording));
        assert!(!DictationState::Idle.can_transition_to(&DictationState::Idle));
        assert!(!DictationState::Recording.can_transition_to(&DictationState::Recording));
    }

    #[test]
    fn test_only_recording_is_listening() {
        assert!(DictationState::Recording.is_listening());
        assert!(!DictationState::Idle.is_listening());
        assert!(!DictationState::Processing.is_listening());
    }

    #[test]
    fn test_state_machine_full_cycle() {
        let sm = StateMachine::new();
        assert_eq!(sm.current(), DictationState::Idle);

        sm.transition(DictationState::Recording).unwrap();
        sm.transition(DictationState::Processing).unwrap();
        sm.transition(DictationState::Idle).unwrap();
        assert_eq!(sm.current(), DictationState::Idle);
    }

    #[test]
    fn test_state_machine_rejects_invalid() {
        let sm = StateMachine::new();
        let result = sm.transition(DictationState::Processing);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Invalid state transition: Idle -> Processing"));
        assert_eq!(sm.current(), DictationState::Idle);
    }

    #[test]
    fn test_state_machine_reset() {
        let sm = StateMachine::new();
        sm.transition(DictationState::Recording).unwrap();
        sm.transition(DictationState::Processing).unwrap();
        sm.reset();
        assert_eq!(sm.current(), DictationState::Idle);
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let sm = StateMachine::new();
        let mut rx = sm.subscribe();
        sm.transition(DictationState::Recording).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), DictationState::Recording);
    }
}
