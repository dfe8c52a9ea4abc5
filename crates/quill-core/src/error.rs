use thiserror::Error;

use crate::types::Permission;

/// Top-level error type for Quill infrastructure (config, I/O, serialization).
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for QuillError` where crossing a crate boundary with
/// `?` is useful.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuillError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Dictation error: {0}")]
    Dictation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Shutdown in progress")]
    ShuttingDown,
}

impl From<toml::de::Error> for QuillError {
    fn from(err: toml::de::Error) -> Self {
        QuillError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for QuillError {
    fn from(err: toml::ser::Error) -> Self {
        QuillError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for QuillError {
    fn from(err: serde_json::Error) -> Self {
        QuillError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Quill operations.
pub type Result<T> = std::result::Result<T, QuillError>;

// =============================================================================
// Cycle outcome taxonomy
// =============================================================================

/// Terminal failure of one dictation cycle.
///
/// Every stage converts its own error into one of these. None of them is
/// fatal to the process: the controller reports it and returns to `Idle`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CycleError {
    #[error("{0} permission denied")]
    PermissionDenied(Permission),

    #[error("Audio capture failed: {0}")]
    Capture(String),

    #[error("No audio was captured")]
    NoAudio,

    #[error("Missing dependency: {tool}")]
    MissingDependency { tool: String, output: String },

    #[error("Transcription failed")]
    TranscriptionFailed { output: String },

    #[error("No speech detected")]
    EmptyTranscription,

    #[error("Text injection failed: {0}")]
    Inject(String),
}

impl CycleError {
    /// Stable snake_case identifier, used in events and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CycleError::PermissionDenied(_) => "permission_denied",
            CycleError::Capture(_) => "capture_error",
            CycleError::NoAudio => "no_audio",
            CycleError::MissingDependency { .. } => "missing_dependency",
            CycleError::TranscriptionFailed { .. } => "transcription_error",
            CycleError::EmptyTranscription => "empty_transcription",
            CycleError::Inject(_) => "inject_error",
        }
    }

    /// Human-readable status line for the presentation layer.
    pub fn status_text(&self) -> String {
        match self {
            CycleError::PermissionDenied(Permission::Microphone) => {
                "Microphone access required. Grant it in the system privacy settings.".to_string()
            }
            CycleError::PermissionDenied(Permission::InputInjection) => {
                "Accessibility access required. Grant it in the system privacy settings."
                    .to_string()
            }
            CycleError::Capture(reason) => format!("Recording error: {}", reason),
            CycleError::NoAudio => "no audio captured".to_string(),
            CycleError::MissingDependency { tool, .. } => {
                format!("{} not found. Install it and try again.", tool)
            }
            CycleError::TranscriptionFailed { .. } => "transcription failed".to_string(),
            CycleError::EmptyTranscription => "no speech detected".to_string(),
            CycleError::Inject(reason) => format!("could not insert text: {}", reason),
        }
    }

    /// Placeholder text pasted into the focused field in place of a transcript,
    /// for failures the user would otherwise not notice.
    pub fn placeholder(&self) -> Option<String> {
        match self {
            CycleError::EmptyTranscription => Some("(no speech detected)".to_string()),
            CycleError::TranscriptionFailed { .. } => Some("(transcription failed)".to_string()),
            CycleError::MissingDependency { tool, .. } => {
                Some(format!("({} not found, install it and try again)", tool))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QuillError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let quill_err: QuillError = io_err.into();
        assert!(matches!(quill_err, QuillError::Io(_)));
        assert!(quill_err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let err: std::result::Result<toml::Value, _> = toml::from_str("invalid = [[[");
        let quill_err: QuillError = err.unwrap_err().into();
        assert!(matches!(quill_err, QuillError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let quill_err: QuillError = err.unwrap_err().into();
        assert!(matches!(quill_err, QuillError::Serialization(_)));
    }

    #[test]
    fn test_cycle_error_kinds_are_distinct() {
        let errors = vec![
            CycleError::PermissionDenied(Permission::Microphone),
            CycleError::Capture("device lost".into()),
            CycleError::NoAudio,
            CycleError::MissingDependency {
                tool: "ffmpeg".into(),
                output: String::new(),
            },
            CycleError::TranscriptionFailed {
                output: String::new(),
            },
            CycleError::EmptyTranscription,
            CycleError::Inject("paste".into()),
        ];
        let mut kinds: Vec<&str> = errors.iter().map(|e| e.kind()).collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), 7);
    }

    #[test]
    fn test_cycle_error_placeholders() {
        assert_eq!(
            CycleError::EmptyTranscription.placeholder().as_deref(),
            Some("(no speech detected)")
        );
        assert_eq!(
            CycleError::TranscriptionFailed {
                output: "boom".into()
            }
            .placeholder()
            .as_deref(),
            Some("(transcription failed)")
        );
        let missing = CycleError::MissingDependency {
            tool: "ffmpeg".into(),
            output: "ffmpeg: not found".into(),
        };
        assert!(missing.placeholder().unwrap().contains("ffmpeg"));
        assert!(CycleError::NoAudio.placeholder().is_none());
        assert!(CycleError::PermissionDenied(Permission::Microphone)
            .placeholder()
            .is_none());
    }

    #[test]
    fn test_cycle_error_status_text() {
        assert_eq!(
            CycleError::EmptyTranscription.status_text(),
            "no speech detected"
        );
        assert!(CycleError::PermissionDenied(Permission::Microphone)
            .status_text()
            .contains("Microphone"));
        assert!(CycleError::MissingDependency {
            tool: "ffmpeg".into(),
            output: String::new()
        }
        .status_text()
        .starts_with("ffmpeg not found"));
    }

    #[test]
    fn test_cycle_error_display() {
        assert_eq!(
            CycleError::PermissionDenied(Permission::InputInjection).to_string(),
            "input injection permission denied"
        );
        assert_eq!(CycleError::NoAudio.to_string(), "No audio was captured");
    }
}
