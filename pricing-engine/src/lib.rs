//! Pricing Engine for SangoFX
//!
//! Tiered-fee quote computation for the XAF/USDT desk

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod engine;
pub mod error;
pub mod tiers;
pub mod types;

pub use engine::PricingEngine;
pub use error::{Error, Result};
pub use tiers::{FeeSchedule, FeeTier};
pub use types::*;
