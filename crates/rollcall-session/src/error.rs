//! Error types for session lifecycle and marking.
//!
//! State errors are deliberately distinct from storage errors: the UI must
//! be able to tell a user *why* marking was refused (session closed, already
//! marked) without parsing database failures.

use rollcall_core::SessionStatus;
use rollcall_storage::StorageError;
use thiserror::Error;

/// Result type alias for session operations.
pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Errors from session lifecycle and marking operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No session exists with the given id.
    #[error("Session not found: {session_id}")]
    NotFound { session_id: String },

    /// Marking was attempted on a session that is not OPEN.
    #[error("Session is not open (status: {status})")]
    NotOpen { status: SessionStatus },

    /// An attendance record already exists for this (session, student).
    #[error("Student {student_id} is already marked for session {session_id}")]
    AlreadyMarked {
        session_id: String,
        student_id: String,
    },

    /// The requested status change is not a legal transition.
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },

    /// Link-based marking on a session that does not allow it.
    #[error("Session {session_id} does not allow remote marking")]
    RemoteMarkingDisabled { session_id: String },

    /// Underlying storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SessionError {
    /// True for expected, user-facing state conditions (as opposed to
    /// storage faults).
    #[must_use]
    pub fn is_state_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::NotOpen { .. }
                | Self::AlreadyMarked { .. }
                | Self::InvalidTransition { .. }
                | Self::RemoteMarkingDisabled { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_errors_are_classified() {
        let error = SessionError::NotOpen {
            status: SessionStatus::Closed,
        };
        assert!(error.is_state_error());
        assert_eq!(error.to_string(), "Session is not open (status: CLOSED)");

        let error = SessionError::AlreadyMarked {
            session_id: "s".to_string(),
            student_id: "x".to_string(),
        };
        assert!(error.is_state_error());
    }
}
