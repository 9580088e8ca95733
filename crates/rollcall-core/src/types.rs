use crate::{
    Result,
    constants::{MAX_CONFIDENCE, MAX_ID_LENGTH, MIN_ID_LENGTH},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Student identifier (1-64 ASCII characters, no surrounding whitespace).
///
/// This is the registrar-assigned identifier used as the key for enrollment
/// and attendance records. It is opaque to this system beyond validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StudentId(String);

impl StudentId {
    /// Create a new student id with validation.
    ///
    /// The value is trimmed before validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidStudentId` if the trimmed value is empty,
    /// longer than 64 characters, or contains non-ASCII characters.
    pub fn new(id: &str) -> Result<Self> {
        let id = id.trim();

        let len = id.len();
        if !(MIN_ID_LENGTH..=MAX_ID_LENGTH).contains(&len) {
            return Err(Error::InvalidStudentId(format!(
                "Student id must be {MIN_ID_LENGTH}-{MAX_ID_LENGTH} chars, got {len}"
            )));
        }

        if !id.is_ascii() {
            return Err(Error::InvalidStudentId(
                "Student id must be ASCII".to_string(),
            ));
        }

        Ok(StudentId(id.to_string()))
    }

    /// Get the student id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for StudentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        StudentId::new(s)
    }
}

/// Course identifier (same constraints as [`StudentId`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CourseId(String);

impl CourseId {
    /// Create a new course id with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidCourseId` if the trimmed value is empty,
    /// longer than 64 characters, or contains non-ASCII characters.
    pub fn new(id: &str) -> Result<Self> {
        let id = id.trim();

        let len = id.len();
        if !(MIN_ID_LENGTH..=MAX_ID_LENGTH).contains(&len) {
            return Err(Error::InvalidCourseId(format!(
                "Course id must be {MIN_ID_LENGTH}-{MAX_ID_LENGTH} chars, got {len}"
            )));
        }

        if !id.is_ascii() {
            return Err(Error::InvalidCourseId(
                "Course id must be ASCII".to_string(),
            ));
        }

        Ok(CourseId(id.to_string()))
    }

    /// Get the course id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CourseId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        CourseId::new(s)
    }
}

/// Capture modality behind the adapter.
///
/// Identifies the underlying capture technology. The three variants differ
/// only in transport; the capture contract is identical across all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    /// Browser platform authenticator (WebAuthn-style, pushed captures).
    PlatformAuthenticator,
    /// Vendor USB scanner bridged through the backend device service.
    VendorBridged,
    /// Device owned and driven entirely by the backend.
    BackendManaged,
}

impl Modality {
    /// Stable tag used on wire payloads and in stored template metadata.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlatformAuthenticator => "platform_authenticator",
            Self::VendorBridged => "vendor_bridged",
            Self::BackendManaged => "backend_managed",
        }
    }

    /// Parse a modality from its stable tag.
    ///
    /// # Errors
    /// Returns `Error::UnknownModality` for unrecognized tags.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "platform_authenticator" => Ok(Self::PlatformAuthenticator),
            "vendor_bridged" => Ok(Self::VendorBridged),
            "backend_managed" => Ok(Self::BackendManaged),
            other => Err(Error::UnknownModality(other.to_string())),
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::PlatformAuthenticator => write!(f, "Platform authenticator"),
            Self::VendorBridged => write!(f, "Vendor scanner (bridged)"),
            Self::BackendManaged => write!(f, "Backend managed device"),
        }
    }
}

/// Operations a capture device reports support for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// One-off template capture.
    Capture,
    /// Repeated captures suitable for enrollment.
    Enroll,
    /// Capture for comparison against a stored template.
    Verify,
}

/// How an attendance record was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationMethod {
    /// Fingerprint verification against the stored template.
    Biometric,
    /// Teacher override, used when the student is not enrolled.
    Manual,
    /// Remote link-based marking; requires the session to allow it.
    Link,
}

impl VerificationMethod {
    /// Stable uppercase tag used in storage and on the wire.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Biometric => "BIOMETRIC",
            Self::Manual => "MANUAL",
            Self::Link => "LINK",
        }
    }

    /// Parse a method from its stable tag.
    ///
    /// # Errors
    /// Returns `Error::UnknownVerificationMethod` for unrecognized tags.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "BIOMETRIC" => Ok(Self::Biometric),
            "MANUAL" => Ok(Self::Manual),
            "LINK" => Ok(Self::Link),
            other => Err(Error::UnknownVerificationMethod(other.to_string())),
        }
    }
}

impl fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status recorded on an attendance record.
///
/// The core only ever writes `Present`; the remaining variants exist for
/// administrative corrections applied outside this system and must round
/// trip through storage unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl AttendanceStatus {
    /// Stable uppercase tag used in storage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "PRESENT",
            Self::Absent => "ABSENT",
            Self::Late => "LATE",
            Self::Excused => "EXCUSED",
        }
    }

    /// Parse a status from its stable tag.
    ///
    /// # Errors
    /// Returns `Error::UnknownAttendanceStatus` for unrecognized tags.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "PRESENT" => Ok(Self::Present),
            "ABSENT" => Ok(Self::Absent),
            "LATE" => Ok(Self::Late),
            "EXCUSED" => Ok(Self::Excused),
            other => Err(Error::UnknownAttendanceStatus(other.to_string())),
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of an attendance session.
///
/// Transitions are one-directional: an open session may close or be
/// cancelled, and both of those states are terminal. A session never
/// reopens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    /// Marking is allowed.
    Open,
    /// Closed by the teacher; terminal.
    Closed,
    /// Cancelled before or during the session; terminal.
    Cancelled,
}

impl SessionStatus {
    /// Check if transition to target status is valid from this status.
    ///
    /// # Examples
    ///
    /// ```
    /// use rollcall_core::SessionStatus;
    ///
    /// assert!(SessionStatus::Open.can_transition_to(SessionStatus::Closed));
    /// assert!(SessionStatus::Open.can_transition_to(SessionStatus::Cancelled));
    /// assert!(!SessionStatus::Closed.can_transition_to(SessionStatus::Open));
    /// assert!(!SessionStatus::Cancelled.can_transition_to(SessionStatus::Closed));
    /// ```
    #[must_use]
    pub fn can_transition_to(&self, target: SessionStatus) -> bool {
        matches!(
            (self, target),
            (SessionStatus::Open, SessionStatus::Closed)
                | (SessionStatus::Open, SessionStatus::Cancelled)
        )
    }

    /// Returns `true` for Closed and Cancelled.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Cancelled)
    }

    /// Returns `true` if marking is allowed.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Stable uppercase tag used in storage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parse a status from its stable tag.
    ///
    /// # Errors
    /// Returns `Error::UnknownSessionStatus` for unrecognized tags.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "OPEN" => Ok(Self::Open),
            "CLOSED" => Ok(Self::Closed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(Error::UnknownSessionStatus(other.to_string())),
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Comparator confidence (0-100).
///
/// Reported by the Template Store's comparator and carried on biometric
/// attendance records. The match decision is made by comparing against a
/// configured threshold; the raw value is always preserved so callers can
/// display it even on rejection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Confidence(f64);

impl Confidence {
    /// Create a confidence value with range validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfidence` if the value is not a finite
    /// number in 0-100.
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() || !(0.0..=MAX_CONFIDENCE).contains(&value) {
            return Err(Error::InvalidConfidence(format!(
                "Confidence must be 0-{MAX_CONFIDENCE}, got {value}"
            )));
        }
        Ok(Confidence(value))
    }

    /// Get the raw confidence value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Whether this confidence satisfies the given threshold.
    ///
    /// The threshold is inclusive on the accept side: a confidence exactly
    /// equal to the threshold counts as a match.
    #[must_use]
    pub fn meets(&self, threshold: f64) -> bool {
        self.0 >= threshold
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_MATCH_THRESHOLD;
    use rstest::rstest;

    #[rstest]
    #[case("S1001", "S1001")]
    #[case("  S1001  ", "S1001")] // trimmed
    #[case("a", "a")]
    fn test_student_id_valid(#[case] input: &str, #[case] expected: &str) {
        let id = StudentId::new(input).unwrap();
        assert_eq!(id.as_str(), expected);
    }

    #[rstest]
    #[case("")] // empty
    #[case("   ")] // whitespace only
    #[case("Stüdent")] // non-ASCII
    fn test_student_id_invalid(#[case] input: &str) {
        assert!(StudentId::new(input).is_err());
    }

    #[test]
    fn test_student_id_length_limit() {
        let long = "x".repeat(65);
        assert!(StudentId::new(&long).is_err());

        let max = "x".repeat(64);
        assert!(StudentId::new(&max).is_ok());
    }

    #[test]
    fn test_course_id_from_str() {
        let id: CourseId = "CS-101".parse().unwrap();
        assert_eq!(id.as_str(), "CS-101");

        let result: Result<CourseId> = "".parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_modality_round_trip() {
        for modality in [
            Modality::PlatformAuthenticator,
            Modality::VendorBridged,
            Modality::BackendManaged,
        ] {
            assert_eq!(Modality::parse(modality.as_str()).unwrap(), modality);
        }

        assert!(Modality::parse("usb").is_err());
    }

    #[test]
    fn test_verification_method_tags() {
        assert_eq!(VerificationMethod::Biometric.as_str(), "BIOMETRIC");
        assert_eq!(VerificationMethod::Manual.as_str(), "MANUAL");
        assert_eq!(VerificationMethod::Link.as_str(), "LINK");

        assert_eq!(
            VerificationMethod::parse("MANUAL").unwrap(),
            VerificationMethod::Manual
        );
        assert!(VerificationMethod::parse("manual").is_err());
    }

    #[test]
    fn test_attendance_status_round_trip() {
        for status in [
            AttendanceStatus::Present,
            AttendanceStatus::Absent,
            AttendanceStatus::Late,
            AttendanceStatus::Excused,
        ] {
            assert_eq!(AttendanceStatus::parse(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn test_session_status_transitions() {
        assert!(SessionStatus::Open.can_transition_to(SessionStatus::Closed));
        assert!(SessionStatus::Open.can_transition_to(SessionStatus::Cancelled));

        // Terminal states allow no transitions
        assert!(!SessionStatus::Closed.can_transition_to(SessionStatus::Open));
        assert!(!SessionStatus::Closed.can_transition_to(SessionStatus::Cancelled));
        assert!(!SessionStatus::Cancelled.can_transition_to(SessionStatus::Open));
        assert!(!SessionStatus::Cancelled.can_transition_to(SessionStatus::Closed));

        // Self transitions are invalid
        assert!(!SessionStatus::Open.can_transition_to(SessionStatus::Open));
    }

    #[test]
    fn test_session_status_predicates() {
        assert!(SessionStatus::Open.is_open());
        assert!(!SessionStatus::Open.is_terminal());
        assert!(SessionStatus::Closed.is_terminal());
        assert!(SessionStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_session_status_parse() {
        assert_eq!(SessionStatus::parse("OPEN").unwrap(), SessionStatus::Open);
        assert_eq!(
            SessionStatus::parse("CANCELLED").unwrap(),
            SessionStatus::Cancelled
        );
        assert!(SessionStatus::parse("open").is_err());
    }

    #[test]
    fn test_confidence_range() {
        assert!(Confidence::new(0.0).is_ok());
        assert!(Confidence::new(100.0).is_ok());
        assert!(Confidence::new(-0.1).is_err());
        assert!(Confidence::new(100.1).is_err());
        assert!(Confidence::new(f64::NAN).is_err());
    }

    #[test]
    fn test_confidence_threshold_inclusive() {
        let at_threshold = Confidence::new(DEFAULT_MATCH_THRESHOLD).unwrap();
        assert!(at_threshold.meets(DEFAULT_MATCH_THRESHOLD));

        let below = Confidence::new(74.9).unwrap();
        assert!(!below.meets(DEFAULT_MATCH_THRESHOLD));

        let above = Confidence::new(82.0).unwrap();
        assert!(above.meets(DEFAULT_MATCH_THRESHOLD));
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&SessionStatus::Cancelled).unwrap();
        assert_eq!(json, "\"CANCELLED\"");

        let method: VerificationMethod = serde_json::from_str("\"BIOMETRIC\"").unwrap();
        assert_eq!(method, VerificationMethod::Biometric);
    }
}
