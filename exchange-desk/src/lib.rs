//! Exchange Desk
//!
//! Orchestrates the XAF/USDT desk: daily rates, tiered quotes, wallet
//! allocation and the administrator decision flow.
//!
//! # Flow
//!
//! 1. **Rate**: An administrator sets the day's buy and sell rates
//! 2. **Quote**: A request is priced against today's rate and the
//!    tiered fee schedule; a day without a rate prices nothing
//! 3. **Submission**: The quote legs are snapshotted into a pending
//!    transaction along with an allocated settlement destination
//! 4. **Decision**: An administrator approves or rejects exactly once;
//!    the owner is notified either way
//!
//! # Example
//!
//! ```no_run
//! use exchange_desk::{Config, ExchangeDesk};
//! use rust_decimal::Decimal;
//!
//! #[tokio::main]
//! async fn main() -> exchange_desk::Result<()> {
//!     let config = Config::default();
//!     let desk = ExchangeDesk::new(config).await?;
//!
//!     let quote = desk.quote_buy(Decimal::from(100_000))?;
//!     println!("{} XAF buys {} USDT", quote.amount_xaf, quote.usdt_out);
//!
//!     desk.shutdown().await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod config;
pub mod desk;
pub mod directory;
pub mod error;
pub mod notify;

// Re-exports
pub use config::Config;
pub use desk::ExchangeDesk;
pub use directory::{StaticDirectory, UserDirectory};
pub use error::{Error, Result};
pub use notify::{Notifier, TracingNotifier};
