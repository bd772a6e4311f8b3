//! SangoFX Desk Core
//!
//! Stateful core of the XAF/USDT exchange desk: daily rates, settlement
//! wallets and the exchange transaction book.
//!
//! # Architecture
//!
//! - **Single Writer**: All transaction writes flow through one actor task
//! - **Atomic Commits**: Each transition is one RocksDB write batch, the
//!   paired notification records included
//! - **Snapshots**: Transactions capture the applied rate and settlement
//!   destination at creation and never re-read them
//!
//! # Invariants
//!
//! - `Pending` is the only state with successors; `Completed` and
//!   `Rejected` are terminal
//! - A transaction is decided exactly once (`decided_at` set once)
//! - Pricing never reads a rate from a different calendar date

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod actor;
pub mod book;
pub mod config;
pub mod error;
pub mod metrics;
pub mod rates;
pub mod storage;
pub mod types;
pub mod wallets;

// Re-exports
pub use book::TransactionBook;
pub use config::CoreConfig;
pub use error::{Error, Result};
pub use rates::RateStore;
pub use types::{
    ClientId, Decision, Direction, EventKind, ExchangeRate, ExchangeTransaction, NewTransaction,
    NotificationRecord, TransactionStatus, WalletKind, WalletRecord,
};
pub use wallets::WalletDirectory;
