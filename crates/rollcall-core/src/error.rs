use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Identifier errors
    #[error("Invalid student id: {0}")]
    InvalidStudentId(String),

    #[error("Invalid course id: {0}")]
    InvalidCourseId(String),

    // Value errors
    #[error("Invalid quality score: {0}")]
    InvalidQuality(String),

    #[error("Invalid confidence value: {0}")]
    InvalidConfidence(String),

    // Enum parse errors
    #[error("Unknown session status: {0}")]
    UnknownSessionStatus(String),

    #[error("Unknown attendance status: {0}")]
    UnknownAttendanceStatus(String),

    #[error("Unknown verification method: {0}")]
    UnknownVerificationMethod(String),

    #[error("Unknown capture modality: {0}")]
    UnknownModality(String),

    // State errors
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
