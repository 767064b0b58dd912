//! Entry store error types

use thiserror::Error;

/// Errors that can occur in the entry store
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// SQLite reported an error
    #[error("Database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A stored row could not be decoded
    #[error("Corrupt data: {0}")]
    Corruption(String),

    /// Entry does not exist (or belongs to another user)
    #[error("Entry not found: {0}")]
    NotFound(String),

    /// Mood outside 1..=5 on write
    #[error("Invalid mood {0}: must be between 1 and 5")]
    InvalidMood(u8),

    /// Other rejected input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Lock acquisition failed
    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::NotFound("abc".to_string());
        assert_eq!(err.to_string(), "Entry not found: abc");

        let err = StoreError::InvalidMood(7);
        assert_eq!(err.to_string(), "Invalid mood 7: must be between 1 and 5");
    }

    #[test]
    fn test_sqlite_error_conversion() {
        let err: StoreError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, StoreError::Database(_)));
    }
}
