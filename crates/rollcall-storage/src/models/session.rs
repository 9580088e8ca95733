use chrono::{DateTime, NaiveDate, Utc};
use rollcall_core::{CourseId, SessionStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A teacher-scoped window of time during which marking is allowed.
///
/// # Fields
///
/// * `id` - UUID primary key
/// * `course_id` - Course the session belongs to
/// * `name` - Display name (e.g. "Week 7 lecture")
/// * `scheduled_on` - Calendar date of the session
/// * `starts_at` - Scheduled start time
/// * `ends_at` - Optional scheduled end time
/// * `status` - OPEN, CLOSED or CANCELLED (see [`SessionStatus`])
/// * `allow_remote` - Whether link-based marking is permitted
/// * `created_at` / `updated_at` - Record timestamps
///
/// # Lifecycle
///
/// Created OPEN by a teacher action and mutated only by explicit
/// status-change calls. CLOSED and CANCELLED are terminal; a session never
/// reopens. The scheduling fields are stored as provided and not
/// interpreted by the core.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttendanceSession {
    /// UUID primary key
    pub id: String,

    /// Course the session belongs to
    pub course_id: String,

    /// Display name
    pub name: String,

    /// Calendar date of the session
    pub scheduled_on: NaiveDate,

    /// Scheduled start time
    pub starts_at: DateTime<Utc>,

    /// Optional scheduled end time
    pub ends_at: Option<DateTime<Utc>>,

    /// Lifecycle status tag; use `status()` for the enum
    pub status: String,

    /// Whether link-based marking is permitted
    pub allow_remote: bool,

    /// Record creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last status change timestamp
    pub updated_at: DateTime<Utc>,
}

impl AttendanceSession {
    /// Create a new session in the OPEN state.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        course_id: &CourseId,
        name: impl Into<String>,
        scheduled_on: NaiveDate,
        starts_at: DateTime<Utc>,
        ends_at: Option<DateTime<Utc>>,
        allow_remote: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            course_id: course_id.as_str().to_string(),
            name: name.into(),
            scheduled_on,
            starts_at,
            ends_at,
            status: SessionStatus::Open.as_str().to_string(),
            allow_remote,
            created_at: now,
            updated_at: now,
        }
    }

    /// Get the status as an enum.
    ///
    /// Returns `None` only for rows whose status tag predates the current
    /// schema; the CHECK constraint prevents new ones.
    pub fn status(&self) -> Option<SessionStatus> {
        SessionStatus::parse(&self.status).ok()
    }

    /// Whether marking is currently allowed.
    pub fn is_open(&self) -> bool {
        self.status().is_some_and(|s| s.is_open())
    }
}
