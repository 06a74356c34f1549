use thiserror::Error;

/// Errors that can occur within the hardware subsystem.
#[derive(Debug, Error)]
pub enum HardwareError {
    /// The peripheral is missing, unpowered, or failed to initialise.
    #[error("Hardware unavailable: {0}")]
    Unavailable(String),

    /// The peripheral answered but the transfer failed.
    #[error("Hardware I/O error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, HardwareError>;
