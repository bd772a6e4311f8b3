//! Error types for the pricing engine

use rust_decimal::Decimal;
use thiserror::Error;

/// Pricing error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Requested amount falls below the smallest priced tier
    #[error("Amount {requested} is below the minimum of {minimum}")]
    BelowMinimum {
        /// Smallest amount the schedule prices
        minimum: Decimal,
        /// Amount the caller asked for
        requested: Decimal,
    },

    /// Requested amount reaches or exceeds the schedule ceiling
    #[error("Amount {requested} is at or above the ceiling of {maximum}")]
    AboveMaximum {
        /// First amount the schedule refuses
        maximum: Decimal,
        /// Amount the caller asked for
        requested: Decimal,
    },

    /// Margin and fees consumed the whole rate, or the rate is too
    /// small to price against
    #[error("Effective rate collapsed to {effective_rate}")]
    RateCollapse {
        /// Unusable rate the computation produced
        effective_rate: Decimal,
    },
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
