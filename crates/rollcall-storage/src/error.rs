use thiserror::Error;

/// Storage-specific error types for the attendance store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database connection or query execution failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration execution failed
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Entity not found in database
    #[error("Entity not found: {entity_type} with {field}={value}")]
    NotFound {
        entity_type: String,
        field: String,
        value: String,
    },

    /// An insert collided with an existing row for the same key.
    ///
    /// For attendance records this is the (session, student) uniqueness
    /// constraint firing; the caller translates it into its own
    /// already-marked condition.
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// Data validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl StorageError {
    /// Create a not-found error.
    pub fn not_found(
        entity_type: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    /// Wrap a sqlx error, recognizing unique-constraint violations.
    pub fn from_insert(error: sqlx::Error, context: &str) -> Self {
        match &error {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Duplicate(context.to_string())
            }
            _ => Self::Database(error),
        }
    }

    /// True when the error is a uniqueness collision.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

/// Specialized result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
