#![allow(async_fn_in_trait)]

use crate::error::{StorageError, StorageResult};
use crate::models::AttendanceRecord;
use sqlx::SqlitePool;

/// Repository trait for AttendanceRecord entity operations
///
/// The insert path is where the at-most-once marking guarantee is enforced
/// for real: the table's UNIQUE (session_id, student_id) constraint turns
/// a racing duplicate insert into [`StorageError::Duplicate`], which the
/// marking service reports as already-marked.
pub trait AttendanceRepository: Send + Sync {
    /// Insert a new record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Duplicate`] when a record already exists for
    /// the same (session, student) pair.
    async fn insert(&self, record: &AttendanceRecord) -> StorageResult<()>;

    /// Find the record for a (session, student) pair
    async fn find_by_session_and_student(
        &self,
        session_id: &str,
        student_id: &str,
    ) -> StorageResult<Option<AttendanceRecord>>;

    /// List all records of a session, oldest first
    async fn list_by_session(&self, session_id: &str) -> StorageResult<Vec<AttendanceRecord>>;

    /// Count PRESENT records of a session
    async fn count_present(&self, session_id: &str) -> StorageResult<i64>;
}

/// SQLite implementation of AttendanceRepository
pub struct SqliteAttendanceRepository {
    pool: SqlitePool,
}

impl SqliteAttendanceRepository {
    /// Create a new SQLite attendance repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AttendanceRepository for SqliteAttendanceRepository {
    async fn insert(&self, record: &AttendanceRecord) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO attendance_records (
                id, session_id, student_id, status, method,
                confidence, marked_at, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.session_id)
        .bind(&record.student_id)
        .bind(&record.status)
        .bind(&record.method)
        .bind(record.confidence)
        .bind(record.marked_at)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::from_insert(e, "attendance record"))?;

        Ok(())
    }

    async fn find_by_session_and_student(
        &self,
        session_id: &str,
        student_id: &str,
    ) -> StorageResult<Option<AttendanceRecord>> {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, session_id, student_id, status, method,
                   confidence, marked_at, created_at
            FROM attendance_records
            WHERE session_id = ? AND student_id = ?
            "#,
        )
        .bind(session_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn list_by_session(&self, session_id: &str) -> StorageResult<Vec<AttendanceRecord>> {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, session_id, student_id, status, method,
                   confidence, marked_at, created_at
            FROM attendance_records
            WHERE session_id = ?
            ORDER BY marked_at ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn count_present(&self, session_id: &str) -> StorageResult<i64> {
        let result: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM attendance_records WHERE session_id = ? AND status = 'PRESENT'",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Database;
    use crate::models::AttendanceSession;
    use crate::repositories::session::{SessionRepository, SqliteSessionRepository};
    use chrono::{NaiveDate, Utc};
    use rollcall_core::{CourseId, StudentId, VerificationMethod};

    async fn setup_test_db() -> Database {
        Database::in_memory().await.unwrap()
    }

    async fn create_test_session(db: &Database) -> String {
        let session = AttendanceSession::new(
            &CourseId::new("CS-101").unwrap(),
            "test session",
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            Utc::now(),
            None,
            false,
        );
        SqliteSessionRepository::new(db.pool().clone())
            .create(&session)
            .await
            .unwrap();
        session.id
    }

    fn record_for(session_id: &str, student: &str) -> AttendanceRecord {
        AttendanceRecord::present(
            session_id,
            &StudentId::new(student).unwrap(),
            VerificationMethod::Biometric,
            Some(82.0),
        )
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let db = setup_test_db().await;
        let session_id = create_test_session(&db).await;
        let repo = SqliteAttendanceRepository::new(db.pool().clone());

        repo.insert(&record_for(&session_id, "S1001")).await.unwrap();

        let found = repo
            .find_by_session_and_student(&session_id, "S1001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.student_id, "S1001");
        assert_eq!(found.confidence, Some(82.0));
    }

    #[tokio::test]
    async fn test_duplicate_pair_is_rejected_by_constraint() {
        let db = setup_test_db().await;
        let session_id = create_test_session(&db).await;
        let repo = SqliteAttendanceRepository::new(db.pool().clone());

        repo.insert(&record_for(&session_id, "S1001")).await.unwrap();

        // Fresh record id, same (session, student) pair
        let error = repo
            .insert(&record_for(&session_id, "S1001"))
            .await
            .unwrap_err();
        assert!(error.is_duplicate());

        let records = repo.list_by_session(&session_id).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_same_student_across_sessions_is_fine() {
        let db = setup_test_db().await;
        let first = create_test_session(&db).await;
        let second = create_test_session(&db).await;
        let repo = SqliteAttendanceRepository::new(db.pool().clone());

        repo.insert(&record_for(&first, "S1001")).await.unwrap();
        repo.insert(&record_for(&second, "S1001")).await.unwrap();

        assert_eq!(repo.count_present(&first).await.unwrap(), 1);
        assert_eq!(repo.count_present(&second).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_racing_inserts_resolve_to_one_record() {
        let db = setup_test_db().await;
        let session_id = create_test_session(&db).await;
        let repo = SqliteAttendanceRepository::new(db.pool().clone());

        // Two independently-built records for the same pair, e.g. a retried
        // network request landing on two handlers
        let a = record_for(&session_id, "S1001");
        let b = record_for(&session_id, "S1001");

        let (ra, rb) = futures::join!(repo.insert(&a), repo.insert(&b));
        let successes = [&ra, &rb].iter().filter(|r| r.is_ok()).count();
        let duplicates = [&ra, &rb]
            .iter()
            .filter(|r| r.as_ref().err().is_some_and(|e| e.is_duplicate()))
            .count();

        assert_eq!(successes, 1);
        assert_eq!(duplicates, 1);
        assert_eq!(
            repo.list_by_session(&session_id).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_list_by_session_order() {
        let db = setup_test_db().await;
        let session_id = create_test_session(&db).await;
        let repo = SqliteAttendanceRepository::new(db.pool().clone());

        repo.insert(&record_for(&session_id, "S1001")).await.unwrap();
        repo.insert(&record_for(&session_id, "S2002")).await.unwrap();

        let records = repo.list_by_session(&session_id).await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].marked_at <= records[1].marked_at);
    }
}
