//! Tiered fee schedules
//!
//! A schedule is an ordered list of half-open bands `[lower, upper)`.
//! Both sides of the desk resolve their fee through the same lookup, so
//! adjusting a band is a data change rather than a code change.

use crate::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One pricing band `[lower, upper)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeTier {
    /// Inclusive lower bound
    pub lower: Decimal,

    /// Exclusive upper bound
    pub upper: Decimal,

    /// Fee rate applied to the full requested amount
    pub rate: Decimal,
}

impl FeeTier {
    /// Whether the amount falls inside this band
    pub fn contains(&self, amount: Decimal) -> bool {
        amount >= self.lower && amount < self.upper
    }
}

/// Ordered, non-overlapping fee bands for one side of the desk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeSchedule {
    tiers: Vec<FeeTier>,
}

impl FeeSchedule {
    /// Create a schedule from bands sorted by ascending `lower`
    pub fn new(tiers: Vec<FeeTier>) -> Self {
        Self { tiers }
    }

    /// Canonical XAF schedule for requests the desk fills by selling USDT
    pub fn sell_side_xaf() -> Self {
        Self::new(vec![
            FeeTier {
                lower: Decimal::from(5_000),
                upper: Decimal::from(300_000),
                rate: Decimal::new(151, 4), // 1.51%
            },
            FeeTier {
                lower: Decimal::from(300_000),
                upper: Decimal::from(500_000),
                rate: Decimal::new(1, 2), // 1%
            },
        ])
    }

    /// Canonical USDT schedule for requests the desk fills by buying USDT
    pub fn buy_side_usdt() -> Self {
        Self::new(vec![
            FeeTier {
                lower: Decimal::ONE,
                upper: Decimal::from(500),
                rate: Decimal::new(151, 4), // 1.51%
            },
            FeeTier {
                lower: Decimal::from(500),
                upper: Decimal::from(1_000),
                rate: Decimal::new(10, 2), // 10%
            },
        ])
    }

    /// Fee rate for an amount, or the boundary error when the amount
    /// falls outside the priced range
    pub fn fee_rate_for(&self, amount: Decimal) -> Result<Decimal> {
        if let Some(first) = self.tiers.first() {
            if amount < first.lower {
                return Err(Error::BelowMinimum {
                    minimum: first.lower,
                    requested: amount,
                });
            }
        }

        for tier in &self.tiers {
            if tier.contains(amount) {
                return Ok(tier.rate);
            }
        }

        let maximum = self.tiers.last().map(|t| t.upper).unwrap_or_default();
        Err(Error::AboveMaximum {
            maximum,
            requested: amount,
        })
    }

    /// Smallest amount the schedule prices
    pub fn minimum(&self) -> Decimal {
        self.tiers.first().map(|t| t.lower).unwrap_or_default()
    }

    /// First amount the schedule refuses
    pub fn maximum(&self) -> Decimal {
        self.tiers.last().map(|t| t.upper).unwrap_or_default()
    }
}
