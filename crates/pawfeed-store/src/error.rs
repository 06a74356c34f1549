use thiserror::Error;

/// Errors that can occur within the persistence subsystem.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No row matched the given key.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A stored or submitted entry failed validation.
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
