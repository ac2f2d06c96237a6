use thiserror::Error;

/// Storage layer error type for the curricula catalog.
///
/// Wraps underlying database errors while preserving the full error
/// chain for debugging.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    /// A database operation failed.
    #[cfg(feature = "sqlite")]
    #[error("database operation failed")]
    Database(#[from] sqlx::Error),

    /// Opening or configuring a backend connection failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// A persisted record could not be decoded into a course.
    #[error("corrupt course record: {reason}")]
    CorruptRecord {
        /// What failed to decode
        reason: String,
    },
}

impl StorageError {
    /// Creates a corrupt record error
    pub fn corrupt(reason: impl Into<String>) -> Self {
        Self::CorruptRecord {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
