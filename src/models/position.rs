use crate::constants::DEFAULT_POSITION_TIMEOUT_MS;
use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use time::OffsetDateTime;

/// One fix reported by the device location service.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub coordinates: Coordinates,
    /// Horizontal accuracy radius in meters
    pub accuracy_m: f64,
    pub timestamp: OffsetDateTime,
}

impl Position {
    pub fn new(coordinates: Coordinates, accuracy_m: f64) -> Self {
        Position {
            coordinates,
            accuracy_m,
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PositionErrorKind {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
}

impl fmt::Display for PositionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionErrorKind::PermissionDenied => write!(f, "permission denied"),
            PositionErrorKind::PositionUnavailable => write!(f, "position unavailable"),
            PositionErrorKind::Timeout => write!(f, "timeout"),
        }
    }
}

/// A classified failure of the location subscription.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {detail}")]
pub struct PositionError {
    pub kind: PositionErrorKind,
    pub detail: String,
}

impl PositionError {
    pub fn new(kind: PositionErrorKind, detail: impl Into<String>) -> Self {
        PositionError {
            kind,
            detail: detail.into(),
        }
    }

    /// Remediation text to show the user, one per error class.
    pub fn user_message(&self) -> &'static str {
        match self.kind {
            PositionErrorKind::PermissionDenied => {
                "Location access was denied. Allow location permission for this app in your device settings."
            }
            PositionErrorKind::PositionUnavailable => {
                "Your position is currently unavailable. Check that GPS is enabled and try moving to an open area."
            }
            PositionErrorKind::Timeout => {
                "Getting your position took too long. Please try again."
            }
        }
    }
}

/// Options forwarded to the device location service.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    pub maximum_age: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        WatchOptions {
            enable_high_accuracy: true,
            timeout: Duration::from_millis(DEFAULT_POSITION_TIMEOUT_MS),
            maximum_age: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_distinct() {
        let kinds = [
            PositionErrorKind::PermissionDenied,
            PositionErrorKind::PositionUnavailable,
            PositionErrorKind::Timeout,
        ];
        let messages: Vec<_> = kinds
            .iter()
            .map(|k| PositionError::new(*k, "x").user_message())
            .collect();

        assert_ne!(messages[0], messages[1]);
        assert_ne!(messages[1], messages[2]);
        assert_ne!(messages[0], messages[2]);
    }

    #[test]
    fn test_error_display_includes_kind() {
        let err = PositionError::new(PositionErrorKind::Timeout, "no fix after 10s");
        assert_eq!(err.to_string(), "timeout: no fix after 10s");
    }
}
