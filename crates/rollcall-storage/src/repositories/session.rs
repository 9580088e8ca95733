#![allow(async_fn_in_trait)]

use crate::error::{StorageError, StorageResult};
use crate::models::AttendanceSession;
use chrono::Utc;
use rollcall_core::SessionStatus;
use sqlx::SqlitePool;

/// Repository trait for AttendanceSession entity operations
///
/// This trait uses native async trait methods (Edition 2024 feature),
/// eliminating the need for the async-trait crate while maintaining
/// full async/await support in trait methods.
pub trait SessionRepository: Send + Sync {
    /// Persist a new session
    async fn create(&self, session: &AttendanceSession) -> StorageResult<()>;

    /// Find a session by id
    async fn find_by_id(&self, id: &str) -> StorageResult<Option<AttendanceSession>>;

    /// List sessions of a course, newest first
    async fn list_by_course(
        &self,
        course_id: &str,
        limit: i64,
    ) -> StorageResult<Vec<AttendanceSession>>;

    /// Apply a status transition, guarded on the expected current status.
    ///
    /// Returns `true` when the row was updated; `false` means the session
    /// was not in `from` status at update time (or does not exist), which
    /// lets a concurrent close/cancel lose cleanly instead of clobbering a
    /// terminal state.
    async fn transition_status(
        &self,
        id: &str,
        from: SessionStatus,
        to: SessionStatus,
    ) -> StorageResult<bool>;
}

/// SQLite implementation of SessionRepository
pub struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    /// Create a new SQLite session repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl SessionRepository for SqliteSessionRepository {
    async fn create(&self, session: &AttendanceSession) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO attendance_sessions (
                id, course_id, name, scheduled_on, starts_at, ends_at,
                status, allow_remote, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&session.id)
        .bind(&session.course_id)
        .bind(&session.name)
        .bind(session.scheduled_on)
        .bind(session.starts_at)
        .bind(session.ends_at)
        .bind(&session.status)
        .bind(session.allow_remote)
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::from_insert(e, "attendance session"))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> StorageResult<Option<AttendanceSession>> {
        let session = sqlx::query_as::<_, AttendanceSession>(
            r#"
            SELECT id, course_id, name, scheduled_on, starts_at, ends_at,
                   status, allow_remote, created_at, updated_at
            FROM attendance_sessions
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    async fn list_by_course(
        &self,
        course_id: &str,
        limit: i64,
    ) -> StorageResult<Vec<AttendanceSession>> {
        let sessions = sqlx::query_as::<_, AttendanceSession>(
            r#"
            SELECT id, course_id, name, scheduled_on, starts_at, ends_at,
                   status, allow_remote, created_at, updated_at
            FROM attendance_sessions
            WHERE course_id = ?
            ORDER BY starts_at DESC
            LIMIT ?
            "#,
        )
        .bind(course_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    async fn transition_status(
        &self,
        id: &str,
        from: SessionStatus,
        to: SessionStatus,
    ) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE attendance_sessions
            SET status = ?, updated_at = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(to.as_str())
        .bind(Utc::now())
        .bind(id)
        .bind(from.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
