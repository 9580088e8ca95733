//! Attendance session lifecycle and marking.
//!
//! This crate enforces the two guarantees the rest of the system leans on:
//!
//! - **Session gating** - marking is possible only while a session is OPEN.
//!   Transitions are one-directional (OPEN -> CLOSED, OPEN -> CANCELLED)
//!   and terminal states are final; the transition rules live on
//!   [`SessionStatus`](rollcall_core::SessionStatus) and are additionally
//!   guarded at the SQL level against concurrent status changes.
//! - **At-most-once marking** - one attendance record per
//!   (session, student), whichever capture modality produced the mark. The
//!   service checks before inserting and relies on the storage uniqueness
//!   constraint to resolve races, so retried or concurrent requests yield
//!   exactly one record and an `AlreadyMarked` refusal.
//!
//! ```no_run
//! use rollcall_session::{SessionService, SessionSchedule};
//! use rollcall_storage::{Database, DatabaseConfig};
//! use rollcall_core::{CourseId, StudentId, VerificationMethod};
//! use chrono::{NaiveDate, Utc};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(DatabaseConfig::new("rollcall.db")).await?;
//! let service = SessionService::sqlite(&db);
//!
//! let schedule = SessionSchedule::starting(
//!     NaiveDate::from_ymd_opt(2026, 3, 10).ok_or("bad date")?,
//!     Utc::now(),
//! );
//! let session = service
//!     .open(&CourseId::new("CS-101")?, "Week 7 lecture", schedule, false)
//!     .await?;
//!
//! let record = service
//!     .mark_present(
//!         &session.id,
//!         &StudentId::new("S1001")?,
//!         VerificationMethod::Biometric,
//!         Some(82.0),
//!     )
//!     .await?;
//! println!("marked at {}", record.marked_at);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod service;

pub use error::{SessionError, SessionResult};
pub use service::{SessionSchedule, SessionService};
