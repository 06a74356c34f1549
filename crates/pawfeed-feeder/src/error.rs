use thiserror::Error;

/// Errors that can occur within the feed subsystem.
#[derive(Debug, Error)]
pub enum FeedError {
    /// A feed is already in progress; the trigger was rejected, not queued.
    #[error("Feed already in progress")]
    FeedInProgress,

    /// Feed size must be a positive number of dispenser units.
    #[error("Feed size must be positive")]
    InvalidSize,

    /// Underlying persistence error.
    #[error("Store error: {0}")]
    Store(#[from] pawfeed_store::StoreError),
}

pub type Result<T> = std::result::Result<T, FeedError>;
