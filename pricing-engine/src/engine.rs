//! Two-sided quote computation
//!
//! Both sides share the same shape: resolve the fee band, round the raw
//! fee to reporting precision, restate it per USDT against the base rate
//! and fold it into the effective rate. The rounded fee feeds the
//! per-unit terms; the per-unit terms stay unrounded until the final
//! output amount is computed.

use crate::types::{round2, BuyQuote, SellQuote};
use crate::{Error, FeeSchedule, Result};
use rust_decimal::Decimal;

/// Two-sided quote engine for the XAF/USDT desk
pub struct PricingEngine {
    sell_schedule: FeeSchedule,
    buy_schedule: FeeSchedule,
}

impl PricingEngine {
    /// Create an engine with the canonical fee schedules
    pub fn new() -> Self {
        Self {
            sell_schedule: FeeSchedule::sell_side_xaf(),
            buy_schedule: FeeSchedule::buy_side_usdt(),
        }
    }

    /// Create an engine with custom fee schedules
    pub fn with_schedules(sell_schedule: FeeSchedule, buy_schedule: FeeSchedule) -> Self {
        Self {
            sell_schedule,
            buy_schedule,
        }
    }

    /// Price a request the desk fills by selling USDT
    ///
    /// `requested_xaf` is what the client pays, `sell_rate` the daily
    /// XAF-per-USDT rate, `margin` an absolute spread added on top.
    pub fn price_sell(
        &self,
        requested_xaf: Decimal,
        sell_rate: Decimal,
        margin: Decimal,
    ) -> Result<SellQuote> {
        let tier_rate = self.sell_schedule.fee_rate_for(requested_xaf)?;

        let base_rate = sell_rate + margin;
        if base_rate <= Decimal::ZERO {
            return Err(Error::RateCollapse {
                effective_rate: base_rate,
            });
        }

        // A dust-sized rate overflows the per-unit terms; that is the
        // same configuration error as a non-positive rate.
        let fee_xaf = round2(requested_xaf * tier_rate);
        let usdt_before_fees = requested_xaf
            .checked_div(base_rate)
            .ok_or(Error::RateCollapse {
                effective_rate: base_rate,
            })?;
        let fee_per_usdt = fee_xaf
            .checked_div(base_rate)
            .ok_or(Error::RateCollapse {
                effective_rate: base_rate,
            })?;
        let effective_rate = base_rate
            .checked_add(fee_per_usdt)
            .ok_or(Error::RateCollapse {
                effective_rate: base_rate,
            })?;
        let usdt_out = requested_xaf
            .checked_div(effective_rate)
            .ok_or(Error::RateCollapse { effective_rate })?;

        Ok(SellQuote {
            amount_xaf: requested_xaf,
            base_rate,
            fee_xaf,
            fee_per_usdt: round2(fee_per_usdt),
            effective_rate: round2(effective_rate),
            usdt_before_fees: round2(usdt_before_fees),
            usdt_out: round2(usdt_out),
        })
    }

    /// Price a request the desk fills by buying USDT
    ///
    /// `requested_usdt` is what the client surrenders, `buy_rate` the
    /// daily XAF-per-USDT rate, `margin` an absolute spread taken off.
    pub fn price_buy(
        &self,
        requested_usdt: Decimal,
        buy_rate: Decimal,
        margin: Decimal,
    ) -> Result<BuyQuote> {
        let tier_rate = self.buy_schedule.fee_rate_for(requested_usdt)?;

        let base_rate = buy_rate - margin;
        if base_rate <= Decimal::ZERO {
            return Err(Error::RateCollapse {
                effective_rate: base_rate,
            });
        }

        let fee_usdt = round2(requested_usdt * tier_rate);
        let xaf_before_fees = requested_usdt
            .checked_mul(base_rate)
            .ok_or(Error::RateCollapse {
                effective_rate: base_rate,
            })?;
        let fee_per_usdt = fee_usdt
            .checked_div(base_rate)
            .ok_or(Error::RateCollapse {
                effective_rate: base_rate,
            })?;
        let effective_rate = base_rate - fee_per_usdt;
        if effective_rate <= Decimal::ZERO {
            return Err(Error::RateCollapse { effective_rate });
        }
        // effective_rate < base_rate, so this product stays inside the
        // range the checked_mul above already proved
        let xaf_out = requested_usdt * effective_rate;

        Ok(BuyQuote {
            amount_usdt: requested_usdt,
            base_rate,
            fee_usdt,
            fee_per_usdt: round2(fee_per_usdt),
            effective_rate: round2(effective_rate),
            xaf_before_fees: round2(xaf_before_fees),
            xaf_out: round2(xaf_out),
        })
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new()
    }
}
