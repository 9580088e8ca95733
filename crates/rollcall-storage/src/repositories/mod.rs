//! Repository traits and SQLite implementations.

pub mod attendance;
pub mod session;

pub use attendance::{AttendanceRepository, SqliteAttendanceRepository};
pub use session::{SessionRepository, SqliteSessionRepository};
