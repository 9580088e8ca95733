//! Session lifecycle and marking service.
//!
//! Implements the session state machine over the attendance store:
//! OPEN -> CLOSED and OPEN -> CANCELLED, both terminal, and the
//! at-most-once `mark_present` operation used by every marking path
//! (biometric, manual, link).
//!
//! # Marking Flow
//!
//! The service executes a strict sequence of checks, failing fast at the
//! first refusal:
//!
//! 1. **Session lookup**: deny if absent -> `NotFound`
//! 2. **Session gating**: deny unless status is OPEN -> `NotOpen`
//! 3. **Remote gating**: LINK marking requires `allow_remote` ->
//!    `RemoteMarkingDisabled`
//! 4. **Duplicate check**: deny if a record exists -> `AlreadyMarked`
//! 5. **Insert**: one PRESENT record; a racing duplicate insert is caught
//!    by the storage uniqueness constraint and reported as `AlreadyMarked`
//!
//! The service records method and confidence as provided; the confidence
//! threshold was already applied by the verification coordinator, and the
//! state machine does not re-check it.

use crate::error::{SessionError, SessionResult};
use chrono::{DateTime, NaiveDate, Utc};
use rollcall_core::{CourseId, SessionStatus, StudentId, VerificationMethod};
use rollcall_storage::models::{AttendanceRecord, AttendanceSession};
use rollcall_storage::repositories::{
    AttendanceRepository, SessionRepository, SqliteAttendanceRepository, SqliteSessionRepository,
};
use rollcall_storage::{Database, StorageError};
use tracing::{debug, info, warn};

/// Scheduling fields of a session, stored as provided.
#[derive(Debug, Clone)]
pub struct SessionSchedule {
    /// Calendar date of the session.
    pub scheduled_on: NaiveDate,

    /// Scheduled start time.
    pub starts_at: DateTime<Utc>,

    /// Optional scheduled end time.
    pub ends_at: Option<DateTime<Utc>>,
}

impl SessionSchedule {
    /// Create a schedule with no end time.
    pub fn starting(scheduled_on: NaiveDate, starts_at: DateTime<Utc>) -> Self {
        Self {
            scheduled_on,
            starts_at,
            ends_at: None,
        }
    }

    /// Set the end time.
    #[must_use]
    pub fn ends_at(mut self, ends_at: DateTime<Utc>) -> Self {
        self.ends_at = Some(ends_at);
        self
    }
}

/// Session lifecycle and marking operations over the attendance store.
pub struct SessionService<S, A> {
    sessions: S,
    records: A,
}

impl SessionService<SqliteSessionRepository, SqliteAttendanceRepository> {
    /// Create a service backed by the SQLite repositories.
    pub fn sqlite(db: &Database) -> Self {
        Self {
            sessions: SqliteSessionRepository::new(db.pool().clone()),
            records: SqliteAttendanceRepository::new(db.pool().clone()),
        }
    }
}

impl<S, A> SessionService<S, A>
where
    S: SessionRepository,
    A: AttendanceRepository,
{
    /// Create a service over explicit repositories.
    pub fn new(sessions: S, records: A) -> Self {
        Self { sessions, records }
    }

    /// Open a new session for a course.
    ///
    /// The session is persisted in the OPEN state and marking is allowed
    /// immediately.
    pub async fn open(
        &self,
        course: &CourseId,
        name: impl Into<String>,
        schedule: SessionSchedule,
        allow_remote: bool,
    ) -> SessionResult<AttendanceSession> {
        let session = AttendanceSession::new(
            course,
            name,
            schedule.scheduled_on,
            schedule.starts_at,
            schedule.ends_at,
            allow_remote,
        );

        self.sessions.create(&session).await?;
        info!("Opened session {} for course {}", session.id, course);

        Ok(session)
    }

    /// Close an open session. Terminal; the session never reopens.
    pub async fn close(&self, session_id: &str) -> SessionResult<AttendanceSession> {
        self.transition(session_id, SessionStatus::Closed).await
    }

    /// Cancel an open session. Terminal.
    pub async fn cancel(&self, session_id: &str) -> SessionResult<AttendanceSession> {
        self.transition(session_id, SessionStatus::Cancelled).await
    }

    /// Apply an explicit status change request.
    ///
    /// This is the session-boundary operation behind the status PATCH:
    /// only the transitions the state machine allows are accepted, so a
    /// request to (re)open always fails.
    pub async fn change_status(
        &self,
        session_id: &str,
        target: SessionStatus,
    ) -> SessionResult<AttendanceSession> {
        match target {
            SessionStatus::Closed | SessionStatus::Cancelled => {
                self.transition(session_id, target).await
            }
            SessionStatus::Open => {
                let current = self.session(session_id).await?;
                Err(SessionError::InvalidTransition {
                    from: current.status().unwrap_or(SessionStatus::Open),
                    to: SessionStatus::Open,
                })
            }
        }
    }

    /// Mark a student present in a session.
    ///
    /// The single marking entry point for every modality: biometric
    /// marking passes the verified confidence, manual and link marking pass
    /// `None`. Exactly one record can exist per (session, student); the
    /// check here and the storage uniqueness constraint together make the
    /// guarantee hold across concurrent attempts.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotFound`] if the session does not exist
    /// - [`SessionError::NotOpen`] if the session is CLOSED or CANCELLED
    /// - [`SessionError::RemoteMarkingDisabled`] for LINK marking on a
    ///   session without `allow_remote`
    /// - [`SessionError::AlreadyMarked`] if a record already exists
    pub async fn mark_present(
        &self,
        session_id: &str,
        student: &StudentId,
        method: VerificationMethod,
        confidence: Option<f64>,
    ) -> SessionResult<AttendanceRecord> {
        let session = self.session(session_id).await?;
        let status = parse_status(&session)?;

        if !status.is_open() {
            debug!(
                "Refusing mark for {} on session {}: status {}",
                student, session_id, status
            );
            return Err(SessionError::NotOpen { status });
        }

        if method == VerificationMethod::Link && !session.allow_remote {
            warn!(
                "Refusing link mark for {} on session {}: remote marking disabled",
                student, session_id
            );
            return Err(SessionError::RemoteMarkingDisabled {
                session_id: session_id.to_string(),
            });
        }

        if self
            .records
            .find_by_session_and_student(session_id, student.as_str())
            .await?
            .is_some()
        {
            return Err(SessionError::AlreadyMarked {
                session_id: session_id.to_string(),
                student_id: student.as_str().to_string(),
            });
        }

        let record = AttendanceRecord::present(session_id, student, method, confidence);

        // The storage constraint resolves check/insert races: a duplicate
        // insert from a concurrent attempt surfaces here, not as a second row.
        match self.records.insert(&record).await {
            Ok(()) => {}
            Err(e) if e.is_duplicate() => {
                return Err(SessionError::AlreadyMarked {
                    session_id: session_id.to_string(),
                    student_id: student.as_str().to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            "Marked {} present in session {} via {}{}",
            student,
            session_id,
            method,
            confidence
                .map(|c| format!(" (confidence {c:.1})"))
                .unwrap_or_default()
        );

        Ok(record)
    }

    /// Fetch a session by id.
    pub async fn session(&self, session_id: &str) -> SessionResult<AttendanceSession> {
        self.sessions
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| SessionError::NotFound {
                session_id: session_id.to_string(),
            })
    }

    /// List sessions of a course, newest first.
    pub async fn sessions_for_course(
        &self,
        course: &CourseId,
        limit: i64,
    ) -> SessionResult<Vec<AttendanceSession>> {
        Ok(self.sessions.list_by_course(course.as_str(), limit).await?)
    }

    /// List the attendance records of a session.
    pub async fn records_of(&self, session_id: &str) -> SessionResult<Vec<AttendanceRecord>> {
        Ok(self.records.list_by_session(session_id).await?)
    }

    /// Count students marked present in a session.
    pub async fn present_count(&self, session_id: &str) -> SessionResult<i64> {
        Ok(self.records.count_present(session_id).await?)
    }

    async fn transition(
        &self,
        session_id: &str,
        target: SessionStatus,
    ) -> SessionResult<AttendanceSession> {
        let session = self.session(session_id).await?;
        let current = parse_status(&session)?;

        if !current.can_transition_to(target) {
            debug!(
                "Refusing transition of session {}: {} -> {}",
                session_id, current, target
            );
            return Err(SessionError::InvalidTransition {
                from: current,
                to: target,
            });
        }

        // Guarded update: applies only while the row still holds `current`,
        // so a concurrent close/cancel loses here instead of overwriting.
        let applied = self
            .sessions
            .transition_status(session_id, current, target)
            .await?;

        if !applied {
            let latest = self.session(session_id).await?;
            let from = parse_status(&latest)?;
            return Err(SessionError::InvalidTransition { from, to: target });
        }

        info!("Session {} transitioned {} -> {}", session_id, current, target);
        self.session(session_id).await
    }
}

fn parse_status(session: &AttendanceSession) -> SessionResult<SessionStatus> {
    session.status().ok_or_else(|| {
        SessionError::Storage(StorageError::Validation(format!(
            "session {} has unknown status tag '{}'",
            session.id, session.status
        )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_storage::Database;

    async fn service() -> SessionService<SqliteSessionRepository, SqliteAttendanceRepository> {
        let db = Database::in_memory().await.unwrap();
        SessionService::sqlite(&db)
    }

    fn course() -> CourseId {
        CourseId::new("CS-101").unwrap()
    }

    fn student(id: &str) -> StudentId {
        StudentId::new(id).unwrap()
    }

    fn schedule() -> SessionSchedule {
        SessionSchedule::starting(
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            Utc::now(),
        )
    }

    async fn open_session(
        service: &SessionService<SqliteSessionRepository, SqliteAttendanceRepository>,
    ) -> AttendanceSession {
        service
            .open(&course(), "Week 7 lecture", schedule(), false)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_open_session_allows_marking() {
        let service = service().await;
        let session = open_session(&service).await;

        let record = service
            .mark_present(
                &session.id,
                &student("S1001"),
                VerificationMethod::Biometric,
                Some(82.0),
            )
            .await
            .unwrap();

        assert_eq!(record.status, "PRESENT");
        assert_eq!(record.method, "BIOMETRIC");
        assert_eq!(record.confidence, Some(82.0));
    }

    #[tokio::test]
    async fn test_second_mark_is_rejected_with_one_record() {
        let service = service().await;
        let session = open_session(&service).await;

        service
            .mark_present(&session.id, &student("S1001"), VerificationMethod::Biometric, Some(82.0))
            .await
            .unwrap();

        let error = service
            .mark_present(&session.id, &student("S1001"), VerificationMethod::Manual, None)
            .await
            .unwrap_err();

        assert!(matches!(error, SessionError::AlreadyMarked { .. }));
        assert_eq!(service.records_of(&session.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_marking_closed_session_fails() {
        let service = service().await;
        let session = open_session(&service).await;

        service.close(&session.id).await.unwrap();

        let error = service
            .mark_present(&session.id, &student("S1001"), VerificationMethod::Manual, None)
            .await
            .unwrap_err();

        match error {
            SessionError::NotOpen { status } => assert_eq!(status, SessionStatus::Closed),
            other => panic!("expected NotOpen, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_marking_cancelled_session_fails_regardless_of_method() {
        let service = service().await;
        let session = open_session(&service).await;

        service.cancel(&session.id).await.unwrap();

        for method in [
            VerificationMethod::Biometric,
            VerificationMethod::Manual,
        ] {
            let error = service
                .mark_present(&session.id, &student("S1001"), method, Some(99.0))
                .await
                .unwrap_err();
            assert!(matches!(error, SessionError::NotOpen { .. }));
        }
    }

    #[tokio::test]
    async fn test_terminal_states_refuse_transitions() {
        let service = service().await;
        let session = open_session(&service).await;

        service.close(&session.id).await.unwrap();

        let error = service.cancel(&session.id).await.unwrap_err();
        assert!(matches!(error, SessionError::InvalidTransition { .. }));

        let error = service
            .change_status(&session.id, SessionStatus::Open)
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            SessionError::InvalidTransition {
                to: SessionStatus::Open,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_change_status_applies_legal_transitions() {
        let service = service().await;
        let session = open_session(&service).await;

        let updated = service
            .change_status(&session.id, SessionStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(updated.status(), Some(SessionStatus::Cancelled));
    }

    #[tokio::test]
    async fn test_link_marking_requires_allow_remote() {
        let service = service().await;

        let gated = open_session(&service).await;
        let error = service
            .mark_present(&gated.id, &student("S1001"), VerificationMethod::Link, None)
            .await
            .unwrap_err();
        assert!(matches!(error, SessionError::RemoteMarkingDisabled { .. }));

        let remote = service
            .open(&course(), "remote session", schedule(), true)
            .await
            .unwrap();
        let record = service
            .mark_present(&remote.id, &student("S1001"), VerificationMethod::Link, None)
            .await
            .unwrap();
        assert_eq!(record.method, "LINK");
    }

    #[tokio::test]
    async fn test_mark_on_missing_session() {
        let service = service().await;

        let error = service
            .mark_present("no-such-session", &student("S1001"), VerificationMethod::Manual, None)
            .await
            .unwrap_err();
        assert!(matches!(error, SessionError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_marks_yield_exactly_one_record() {
        let service = service().await;
        let session = open_session(&service).await;

        let s1 = student("S1001");
        let s2 = student("S1001");
        let (a, b) = futures::join!(
            service.mark_present(
                &session.id,
                &s1,
                VerificationMethod::Biometric,
                Some(80.0)
            ),
            service.mark_present(
                &session.id,
                &s2,
                VerificationMethod::Biometric,
                Some(80.0)
            ),
        );

        let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert_eq!(service.records_of(&session.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_present_count_and_queries() {
        let service = service().await;
        let session = open_session(&service).await;

        service
            .mark_present(&session.id, &student("S1001"), VerificationMethod::Biometric, Some(90.0))
            .await
            .unwrap();
        service
            .mark_present(&session.id, &student("S2002"), VerificationMethod::Manual, None)
            .await
            .unwrap();

        assert_eq!(service.present_count(&session.id).await.unwrap(), 2);
        assert_eq!(
            service.sessions_for_course(&course(), 10).await.unwrap().len(),
            1
        );
    }
}
