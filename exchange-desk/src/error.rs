//! Error types for the exchange desk

use desk_core::types::ClientId;
use thiserror::Error;

/// Result type for desk operations
pub type Result<T> = std::result::Result<T, Error>;

/// Desk errors
#[derive(Error, Debug)]
pub enum Error {
    /// Core book error
    #[error("Core error: {0}")]
    Core(#[from] desk_core::Error),

    /// Pricing error
    #[error("Pricing error: {0}")]
    Pricing(#[from] pricing_engine::Error),

    /// Actor may not perform an administrative operation
    #[error("Unauthorized: {0} is not an active administrator")]
    Unauthorized(ClientId),

    /// Notification delivery error
    #[error("Notification delivery error: {0}")]
    Notify(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
