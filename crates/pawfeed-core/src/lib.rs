pub mod config;
pub mod error;

pub use config::PawfeedConfig;
pub use error::{PawfeedError, Result};
