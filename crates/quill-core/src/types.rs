use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Timestamps
// =============================================================================

/// Unix timestamp in milliseconds since epoch.
///
/// Compared by value. Two Timestamps with the same inner value are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp_millis())
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.0).unwrap_or_default()
    }

    /// Milliseconds elapsed since this timestamp.
    pub fn elapsed_ms(&self) -> i64 {
        Timestamp::now().0 - self.0
    }
}

// =============================================================================
// Permissions
// =============================================================================

/// An OS-level authorization required before a dictation cycle may start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Access to the default audio input device.
    Microphone,
    /// Permission to post synthetic keystrokes to other applications.
    InputInjection,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Microphone => write!(f, "microphone"),
            Permission::InputInjection => write!(f, "input injection"),
        }
    }
}

// =============================================================================
// Toggle policy
// =============================================================================

/// What to do with a start request that arrives while a previous cycle is
/// still transcribing or injecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingTogglePolicy {
    /// Keep at most one pending start and replay it when processing ends.
    #[default]
    Queue,
    /// Discard the request (reported, never silent).
    Drop,
}
