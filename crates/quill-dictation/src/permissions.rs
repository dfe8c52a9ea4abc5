//! OS authorization gates checked before a cycle may start.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use quill_core::error::CycleError;
use quill_core::types::Permission;

/// The two authorizations a dictation cycle needs.
pub trait PermissionGate: Send + Sync {
    fn microphone_granted(&self) -> bool;
    fn input_injection_granted(&self) -> bool;

    /// First missing permission, microphone before input injection.
    fn check(&self) -> Result<(), CycleError> {
        if !self.microphone_granted() {
            return Err(CycleError::PermissionDenied(Permission::Microphone));
        }
        if !self.input_injection_granted() {
            return Err(CycleError::PermissionDenied(Permission::InputInjection));
        }
        Ok(())
    }
}

/// For platforms where the OS prompts on first use instead of up front.
///
/// The `quill` binary runs with this gate. Denials surface later, as a
/// `CaptureError` when the input stream is built or an `InjectError` from the
/// paste, wherever the platform reports them.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysGranted;

impl PermissionGate for AlwaysGranted {
    fn microphone_granted(&self) -> bool {
        true
    }

    fn input_injection_granted(&self) -> bool {
        true
    }
}

/// Switchable permissions. Clones share state, so a test can revoke access
/// while the controller holds its own copy.
#[derive(Debug, Clone)]
pub struct StaticPermissions {
    microphone: Arc<AtomicBool>,
    input_injection: Arc<AtomicBool>,
}

impl StaticPermissions {
    pub fn new(microphone: bool, input_injection: bool) -> Self {
        Self {
            microphone: Arc::new(AtomicBool::new(microphone)),
            input_injection: Arc::new(AtomicBool::new(input_injection)),
        }
    }

    pub fn set_microphone(&self, granted: bool) {
        self.microphone.store(granted, Ordering::SeqCst);
    }

    pub fn set_input_injection(&self, granted: bool) {
        self.input_injection.store(granted, Ordering::SeqCst);
    }
}

impl PermissionGate for StaticPermissions {
    fn microphone_granted(&self) -> bool {
        self.microphone.load(Ordering::SeqCst)
    }

    fn input_injection_granted(&self) -> bool {
        self.input_injection.load(Ordering::SeqCst)
    }
}
