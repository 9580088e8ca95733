//! Attendance store: SQLite-backed persistence for sessions and records.
//!
//! This crate is the storage half of the at-most-once marking guarantee.
//! The session service checks state before inserting, but the
//! UNIQUE (session_id, student_id) constraint in the schema is what makes
//! the check-then-insert effectively atomic across stateless request
//! handlers: of two racing marking attempts, exactly one insert succeeds
//! and the other surfaces as [`StorageError::Duplicate`].
//!
//! # Architecture
//!
//! - [`Database`] - connection pool manager with automatic migrations
//!   (WAL mode, foreign keys on)
//! - [`SessionRepository`], [`AttendanceRepository`] - data access traits
//!   with SQLite implementations
//!
//! Status transitions are guarded at the SQL level too:
//! [`SessionRepository::transition_status`] updates only when the row still
//! holds the expected current status, so concurrent close/cancel calls
//! cannot clobber a terminal state.
//!
//! # Examples
//!
//! ```no_run
//! use rollcall_storage::{Database, DatabaseConfig};
//! use rollcall_storage::models::AttendanceSession;
//! use rollcall_storage::repositories::{SessionRepository, SqliteSessionRepository};
//! use rollcall_core::CourseId;
//! use chrono::{NaiveDate, Utc};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(DatabaseConfig::new("rollcall.db")).await?;
//! let sessions = SqliteSessionRepository::new(db.pool().clone());
//!
//! let session = AttendanceSession::new(
//!     &CourseId::new("CS-101")?,
//!     "Week 7 lecture",
//!     NaiveDate::from_ymd_opt(2026, 3, 10).ok_or("bad date")?,
//!     Utc::now(),
//!     None,
//!     false,
//! );
//! sessions.create(&session).await?;
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod models;
pub mod repositories;

pub use connection::{Database, DatabaseConfig};
pub use error::{StorageError, StorageResult};
pub use models::{AttendanceRecord, AttendanceSession};
pub use repositories::{
    AttendanceRepository, SessionRepository, SqliteAttendanceRepository, SqliteSessionRepository,
};
