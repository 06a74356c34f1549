use thiserror::Error;

/// Errors that can occur within the task subsystem.
#[derive(Debug, Error)]
pub enum TaskError {
    /// A live task already holds this name.
    #[error("Task already registered: {name}")]
    DuplicateTask { name: String },

    /// No task with the given name is known to the manager.
    #[error("Task not registered: {name}")]
    NotRegistered { name: String },

    /// The requested interval is zero or out of range.
    #[error("Task interval must be positive: {name}")]
    InvalidInterval { name: String },

    /// `start()` was called twice without an intervening `stop()`.
    #[error("Task manager already started")]
    AlreadyStarted,
}

pub type Result<T> = std::result::Result<T, TaskError>;
