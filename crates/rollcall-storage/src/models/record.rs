use chrono::{DateTime, Utc};
use rollcall_core::{AttendanceStatus, StudentId, VerificationMethod};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The result of one successful marking attempt.
///
/// Unique per (session, student): the schema carries a UNIQUE constraint on
/// the pair, so a second marking attempt cannot create a second row no
/// matter how the request arrived. Created once by the marking operation
/// and never mutated by the core afterwards; status corrections are an
/// external administrative action.
///
/// # Examples
///
/// ```
/// use rollcall_storage::models::AttendanceRecord;
/// use rollcall_core::{StudentId, VerificationMethod};
///
/// let record = AttendanceRecord::present(
///     "3f6f4ce0-5b2b-4d27-9a3b-0f8f6a2d9c11",
///     &StudentId::new("S1001").unwrap(),
///     VerificationMethod::Biometric,
///     Some(82.0),
/// );
///
/// assert_eq!(record.status, "PRESENT");
/// assert_eq!(record.confidence, Some(82.0));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttendanceRecord {
    /// UUID primary key
    pub id: String,

    /// Session the record belongs to
    pub session_id: String,

    /// Student the record belongs to
    pub student_id: String,

    /// Attendance status tag; use `attendance_status()` for the enum
    pub status: String,

    /// Verification method tag; use `verification_method()` for the enum
    pub method: String,

    /// Comparator confidence for biometric marks; absent for manual/link
    pub confidence: Option<f64>,

    /// When the marking happened
    pub marked_at: DateTime<Utc>,

    /// Record creation timestamp (when written to database)
    pub created_at: DateTime<Utc>,
}

impl AttendanceRecord {
    /// Create a PRESENT record, the only status the core writes.
    pub fn present(
        session_id: impl Into<String>,
        student: &StudentId,
        method: VerificationMethod,
        confidence: Option<f64>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            student_id: student.as_str().to_string(),
            status: AttendanceStatus::Present.as_str().to_string(),
            method: method.as_str().to_string(),
            confidence,
            marked_at: now,
            created_at: now,
        }
    }

    /// Get the attendance status as an enum.
    pub fn attendance_status(&self) -> Option<AttendanceStatus> {
        AttendanceStatus::parse(&self.status).ok()
    }

    /// Get the verification method as an enum.
    pub fn verification_method(&self) -> Option<VerificationMethod> {
        VerificationMethod::parse(&self.method).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_record_fields() {
        let student = StudentId::new("S1001").unwrap();
        let record =
            AttendanceRecord::present("session-1", &student, VerificationMethod::Biometric, Some(82.0));

        assert_eq!(record.session_id, "session-1");
        assert_eq!(record.student_id, "S1001");
        assert_eq!(record.attendance_status(), Some(AttendanceStatus::Present));
        assert_eq!(
            record.verification_method(),
            Some(VerificationMethod::Biometric)
        );
        assert_eq!(record.confidence, Some(82.0));
    }

    #[test]
    fn test_manual_record_has_no_confidence() {
        let student = StudentId::new("S2002").unwrap();
        let record =
            AttendanceRecord::present("session-1", &student, VerificationMethod::Manual, None);

        assert_eq!(record.verification_method(), Some(VerificationMethod::Manual));
        assert!(record.confidence.is_none());
    }
}
