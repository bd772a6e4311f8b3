//! Quote types returned by the pricing engine

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Round half-up to two decimal places, the reporting precision for
/// XAF and USDT figures alike.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Quote for a request the desk fills by selling USDT
///
/// The client pays `amount_xaf` and receives `usdt_out`. All fields are
/// rounded to reporting precision; the internal computation keeps the
/// effective rate unrounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellQuote {
    /// XAF the client pays
    pub amount_xaf: Decimal,

    /// Daily rate plus margin, before fees (XAF per USDT)
    pub base_rate: Decimal,

    /// Fee charged on the XAF amount
    pub fee_xaf: Decimal,

    /// Fee restated per USDT delivered
    pub fee_per_usdt: Decimal,

    /// All-in rate the client actually pays (XAF per USDT)
    pub effective_rate: Decimal,

    /// USDT the request would buy at the base rate, before fees
    pub usdt_before_fees: Decimal,

    /// USDT the client receives
    pub usdt_out: Decimal,
}

/// Quote for a request the desk fills by buying USDT
///
/// The client surrenders `amount_usdt` and receives `xaf_out`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyQuote {
    /// USDT the client surrenders
    pub amount_usdt: Decimal,

    /// Daily rate minus margin, before fees (XAF per USDT)
    pub base_rate: Decimal,

    /// Fee charged on the USDT amount
    pub fee_usdt: Decimal,

    /// Fee restated as an XAF-per-USDT rate reduction
    pub fee_per_usdt: Decimal,

    /// All-in rate the client actually receives (XAF per USDT)
    pub effective_rate: Decimal,

    /// XAF the amount would fetch at the base rate, before fees
    pub xaf_before_fees: Decimal,

    /// XAF the client receives
    pub xaf_out: Decimal,
}
