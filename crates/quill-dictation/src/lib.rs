//! Quill Dictation crate - controller state machine, clipboard injection,
//! hotkey and permission gates.
//!
//! Provides the controller that runs one dictation cycle at a time through
//! a strict state machine: Idle -> Recording -> Processing -> Idle.
//! The controller is a single tokio task; callers talk to it through a
//! [`DictationHandle`].

pub mod engine;
pub mod hotkey;
pub mod permissions;
pub mod state;
pub mod text_inject;

pub use engine::{
    ControllerSettings, DictationCommand, DictationController, DictationHandle, DictationSession,
};
pub use hotkey::{HotkeyConfig, HotkeyEvent, HotkeyService};
pub use permissions::{AlwaysGranted, PermissionGate, StaticPermissions};
pub use state::{DictationState, StateMachine};
pub use text_inject::{
    Clipboard, ClipboardContent, ClipboardGuard, ClipboardInjector, EnigoPaste, ImageContent,
    InjectError, InjectTimings, MemoryClipboard, PasteTrigger, RecordingPaste, SystemClipboard,
};
