use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{QuillError, Result};
use crate::types::PendingTogglePolicy;

/// Top-level configuration for Quill.
///
/// Loaded from `~/.quill/config.toml` by default. Each section corresponds
/// to one stage of the dictation pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuillConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub dictation: DictationConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub transcription: TranscriptionConfig,
    #[serde(default)]
    pub inject: InjectConfig,
}

impl QuillConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: QuillConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| QuillError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Dictation controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DictationConfig {
    /// Global hotkey held to dictate.
    pub hotkey: String,
    /// Handling of start requests that arrive while a cycle is processing.
    pub pending_toggle: PendingTogglePolicy,
    /// Paste placeholder text such as "(no speech detected)" on soft failures.
    pub inject_placeholders: bool,
}

impl Default for DictationConfig {
    fn default() -> Self {
        Self {
            hotkey: "F9".to_string(),
            pending_toggle: PendingTogglePolicy::Queue,
            inject_placeholders: true,
        }
    }
}

/// Microphone capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Directory for the cycle's recording. Empty means the OS temp dir.
    pub artifact_dir: String,
    /// File name of the recording inside `artifact_dir`.
    pub file_name: String,
    /// Input device name substring, or "default".
    pub device_name: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            artifact_dir: String::new(),
            file_name: "recording.wav".to_string(),
            device_name: "default".to_string(),
        }
    }
}

impl AudioConfig {
    /// Full path the recorder writes to.
    pub fn artifact_path(&self) -> PathBuf {
        resolve_dir(&self.artifact_dir).join(&self.file_name)
    }
}

/// External transcription process configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Program to launch.
    pub program: String,
    /// Arguments placed before the audio path.
    pub args: Vec<String>,
    /// Model size passed as `--model`.
    pub model: String,
    /// Language passed as `--language`.
    pub language: String,
    /// Directory passed as `--output_dir`. Empty means the OS temp dir.
    pub output_dir: String,
    /// Directories prepended to the child's `PATH` (`~/` is expanded).
    pub extra_path: Vec<String>,
    /// Substring in the process output that identifies a missing encoder.
    pub dependency_signature: String,
    /// Upper bound on a single transcription run.
    pub timeout_secs: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            args: vec!["-m".to_string(), "whisper".to_string()],
            model: "tiny".to_string(),
            language: "en".to_string(),
            output_dir: String::new(),
            extra_path: vec!["~/bin".to_string(), "/usr/local/bin".to_string()],
            dependency_signature: "ffmpeg".to_string(),
            timeout_secs: 300,
        }
    }
}

impl TranscriptionConfig {
    pub fn output_dir_path(&self) -> PathBuf {
        resolve_dir(&self.output_dir)
    }
}

/// Clipboard injection timing, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectConfig {
    /// Wait between writing the clipboard and sending the paste keystroke.
    pub stage_settle_ms: u64,
    /// Wait between the paste keystroke and restoring the clipboard.
    pub paste_settle_ms: u64,
    /// How long the paste chord is held down.
    pub key_hold_ms: u64,
}

impl Default for InjectConfig {
    fn default() -> Self {
        Self {
            stage_settle_ms: 20,
            paste_settle_ms: 100,
            key_hold_ms: 50,
        }
    }
}

/// Expand `~/` and map an empty string to the OS temp dir.
pub fn resolve_dir(dir: &str) -> PathBuf {
    if dir.is_empty() {
        return std::env::temp_dir();
    }
    expand_home(dir)
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(rest)
    } else {
        PathBuf::from(path)
    }
}
