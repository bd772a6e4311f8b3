//! Daily exchange rate store
//!
//! One rate row per calendar date, looked up by exact date only: a day
//! without an explicitly set rate fails closed with `RateUndefined`
//! rather than silently pricing against stale data. The most recently
//! touched row is cached, and the cache is served only when its date
//! matches the requested one, so a day boundary forces revalidation
//! against storage.

use crate::{
    metrics::Metrics,
    storage::Storage,
    types::ExchangeRate,
    Error, Result,
};
use chrono::{NaiveDate, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Mutable store of daily exchange rates
pub struct RateStore {
    storage: Arc<Storage>,
    metrics: Arc<Metrics>,
    cached: RwLock<Option<ExchangeRate>>,
}

impl RateStore {
    /// Create a rate store over shared storage
    pub fn new(storage: Arc<Storage>, metrics: Arc<Metrics>) -> Self {
        Self {
            storage,
            metrics,
            cached: RwLock::new(None),
        }
    }

    /// Rate for pricing decisions on the given day
    ///
    /// Exact-date match only; fails closed with `RateUndefined` when no
    /// rate was set for that day.
    pub fn current_rate(&self, as_of: NaiveDate) -> Result<ExchangeRate> {
        {
            let cached = self.cached.read();
            if let Some(rate) = cached.as_ref() {
                if rate.effective_date == as_of {
                    return Ok(rate.clone());
                }
            }
        }

        match self.storage.get_rate(as_of)? {
            Some(rate) => {
                *self.cached.write() = Some(rate.clone());
                Ok(rate)
            }
            None => Err(Error::RateUndefined(as_of)),
        }
    }

    /// Create or replace the rate row for a date
    ///
    /// Transactions that already captured a snapshot of the replaced
    /// row are not touched.
    pub fn set_rate(
        &self,
        date: NaiveDate,
        buy_rate: Decimal,
        sell_rate: Decimal,
    ) -> Result<ExchangeRate> {
        if buy_rate <= Decimal::ZERO || sell_rate <= Decimal::ZERO {
            return Err(Error::InvalidRate(format!(
                "rates must be positive, got buy={} sell={}",
                buy_rate, sell_rate
            )));
        }

        if sell_rate <= buy_rate {
            tracing::warn!(
                %date,
                %buy_rate,
                %sell_rate,
                "Inverted spread stored, desk pays more than it charges"
            );
        }

        let rate = ExchangeRate {
            effective_date: date,
            buy_rate,
            sell_rate,
            recorded_at: Utc::now(),
        };

        self.storage.put_rate(&rate)?;
        *self.cached.write() = Some(rate.clone());
        self.metrics.record_rate_update();

        Ok(rate)
    }

    /// Most recent rate row by date, for display purposes only
    pub fn latest_rate(&self) -> Result<Option<ExchangeRate>> {
        self.storage.latest_rate()
    }

    /// All rate rows, newest first
    pub fn list_rates(&self) -> Result<Vec<ExchangeRate>> {
        self.storage.list_rates()
    }
}
