//! Error types for the desk core

use thiserror::Error;

/// Result type for desk core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Desk core errors
#[derive(Error, Debug)]
pub enum Error {
    /// No exchange rate explicitly set for the requested day
    #[error("No exchange rate set for {0}")]
    RateUndefined(chrono::NaiveDate),

    /// Rate write rejected (non-positive values)
    #[error("Invalid rate: {0}")]
    InvalidRate(String),

    /// Transaction request rejected before entering the book
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No active settlement wallet matches the request
    #[error("No settlement destination available: {0}")]
    NoDestinationAvailable(String),

    /// Transaction already left the pending state
    #[error("Transaction {id} cannot transition from {status}")]
    InvalidTransition {
        /// Transaction that refused the decision
        id: uuid::Uuid,
        /// Status it already holds
        status: crate::types::TransactionStatus,
    },

    /// Transaction not found
    #[error("Transaction not found: {0}")]
    TransactionNotFound(uuid::Uuid),

    /// Wallet not found
    #[error("Wallet not found: {0}")]
    WalletNotFound(uuid::Uuid),

    /// Notification not found
    #[error("Notification not found: {0}")]
    NotificationNotFound(uuid::Uuid),

    /// Storage error (RocksDB)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Concurrency error (actor mailbox closed, etc.)
    #[error("Concurrency error: {0}")]
    Concurrency(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rocksdb::Error> for Error {
    fn from(err: rocksdb::Error) -> Self {
        Error::Storage(err.to_string())
    }
}
