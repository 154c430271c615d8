//! Error type for ride tracking operations.
//!
//! All errors are local and synchronous: nothing in the crate retries or recovers
//! in the background. Malformed stored rides are not an error here, see [`crate::history`].

use thiserror::Error;

use crate::SessionStatus;

/// Unified error type for ride-tracker operations.
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error), uniffi(flat_error))]
pub enum TrackerError {
    /// Position fix outside valid latitude/longitude bounds. The fix was skipped.
    #[error("Invalid position fix ({latitude}, {longitude})")]
    InvalidFix { latitude: f64, longitude: f64 },

    /// A fix was delivered while the session was not recording.
    #[error("Session is not recording (status: {status:?})")]
    NotRecording { status: SessionStatus },

    /// A state machine transition was requested from the wrong state.
    #[error("Cannot {action} a session in {from:?} state")]
    InvalidTransition {
        from: SessionStatus,
        action: &'static str,
    },

    /// A ride record was requested from a session that has not stopped.
    #[error("Cannot build a ride record from a {status:?} session")]
    InvalidState { status: SessionStatus },

    /// Epoch milliseconds that do not map to a valid instant.
    #[error("Invalid timestamp: {0} ms")]
    InvalidTimestamp(i64),

    /// No stored ride has the given id.
    #[error("Ride not found: {0}")]
    RideNotFound(String),

    /// Ride history could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Serialization(err.to_string())
    }
}

/// Result type alias for ride-tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrackerError::InvalidTransition {
            from: SessionStatus::Stopped,
            action: "start",
        };
        assert_eq!(err.to_string(), "Cannot start a session in Stopped state");

        let err = TrackerError::InvalidFix { latitude: 91.0, longitude: 0.0 };
        assert!(err.to_string().contains("91"));
    }

    #[test]
    fn test_from_serde_error() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: TrackerError = parse.unwrap_err().into();
        assert!(matches!(err, TrackerError::Serialization(_)));
    }
}
