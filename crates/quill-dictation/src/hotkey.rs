//! Global hotkey registration for dictation activation.
//!
//! On Windows, uses the `global-hotkey` crate to register a system-wide
//! hotkey and reports its press and release edges separately: press starts
//! a recording, release stops it.
//!
//! On non-Windows, provides a stub that never reports events; the binary
//! falls back to its console driver there.

use quill_core::config::DictationConfig;
use quill_core::error::QuillError;

use crate::engine::DictationCommand;

/// Configuration for the dictation hotkey.
#[derive(Debug, Clone)]
pub struct HotkeyConfig {
    /// Key code string (e.g., "F9", "Ctrl+Shift+D").
    pub key: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            key: "F9".to_string(),
        }
    }
}

impl From<&DictationConfig> for HotkeyConfig {
    fn from(config: &DictationConfig) -> Self {
        Self {
            key: config.hotkey.clone(),
        }
    }
}

/// One edge of the dictation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyEvent {
    Pressed,
    Released,
}

impl From<HotkeyEvent> for DictationCommand {
    fn from(event: HotkeyEvent) -> Self {
        match event {
            HotkeyEvent::Pressed => DictationCommand::HotkeyPressed,
            HotkeyEvent::Released => DictationCommand::HotkeyReleased,
        }
    }
}

/// Manages the global dictation hotkey.
pub struct HotkeyService {
    config: HotkeyConfig,
    #[cfg(target_os = "windows")]
    manager: global_hotkey::GlobalHotKeyManager,
    #[cfg(target_os = "windows")]
    hotkey: Option<global_hotkey::hotkey::HotKey>,
}

impl HotkeyService {
    /// Create and register the global hotkey.
    #[cfg(target_os = "windows")]
    pub fn new(config: HotkeyConfig) -> Result<Self, QuillError> {
        use global_hotkey::hotkey::HotKey;
        use global_hotkey::GlobalHotKeyManager;
        use std::str::FromStr;

        let manager = GlobalHotKeyManager::new().map_err(|e| {
            QuillError::Dictation(format!("Failed to create hotkey manager: {}", e))
        })?;

        let hotkey = HotKey::from_str(&config.key).map_err(|e| {
            QuillError::Dictation(format!("Failed to parse hotkey '{}': {}", config.key, e))
        })?;

        manager.register(hotkey).map_err(|e| {
            QuillError::Dictation(format!("Failed to register hotkey '{}': {}", config.key, e))
        })?;

        tracing::info!(key = %config.key, "Global hotkey registered");

        Ok(Self {
            config,
            manager,
            hotkey: Some(hotkey),
        })
    }

    /// Stub constructor for non-Windows platforms.
    #[cfg(not(target_os = "windows"))]
    pub fn new(config: HotkeyConfig) -> Result<Self, QuillError> {
        tracing::warn!(key = %config.key, "Global hotkey is only available on Windows");
        Ok(Self { config })
    }

    pub fn config(&self) -> &HotkeyConfig {
        &self.config
    }

    /// Whether this build can deliver real key events.
    pub fn is_supported(&self) -> bool {
        cfg!(target_os = "windows")
    }

    /// Next pending edge of the registered key, if any. Non-blocking.
    #[cfg(target_os = "windows")]
    pub fn poll(&self) -> Option<HotkeyEvent> {
        use global_hotkey::{GlobalHotKeyEvent, HotKeyState};

        let hotkey = self.hotkey.as_ref()?;
        while let Ok(event) = GlobalHotKeyEvent::receiver().try_recv() {
            if event.id() != hotkey.id() {
                continue;
            }
            return Some(match event.state() {
                HotKeyState::Pressed => HotkeyEvent::Pressed,
                HotKeyState::Released => HotkeyEvent::Released,
            });
        }
        None
    }

    /// Stub: never reports an event on non-Windows.
    #[cfg(not(target_os = "windows"))]
    pub fn poll(&self) -> Option<HotkeyEvent> {
        None
    }

    /// Unregister the hotkey.
    #[cfg(target_os = "windows")]
    pub fn unregister(&mut self) {
        if let Some(hotkey) = self.hotkey.take() {
            let _ = self.manager.unregister(hotkey);
            tracing::info!(key = %self.config.key, "Global hotkey unregistered");
        }
    }

    /// Stub unregister.
    #[cfg(not(target_os = "windows"))]
    pub fn unregister(&mut self) {}
}

#[cfg(target_os = "windows")]
impl Drop for HotkeyService {
    fn drop(&mut self) {
        self.unregister();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
