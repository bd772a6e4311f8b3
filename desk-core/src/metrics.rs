//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for monitoring the desk.
//!
//! # Metrics
//!
//! - `desk_transactions_created_total` - Transactions entering the book
//! - `desk_transactions_approved_total` - Approvals committed
//! - `desk_transactions_rejected_total` - Rejections committed
//! - `desk_rate_updates_total` - Daily rate writes
//! - `desk_notifications_recorded_total` - Notification rows committed
//! - `desk_transition_duration_seconds` - Commit latency per transition
//!
//! All metrics register into a per-instance registry so several books
//! can coexist in one process.

use crate::types::TransactionStatus;
use prometheus::{Histogram, HistogramOpts, IntCounter, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Transactions entering the book
    pub transactions_created: IntCounter,

    /// Approvals committed
    pub transactions_approved: IntCounter,

    /// Rejections committed
    pub transactions_rejected: IntCounter,

    /// Daily rate writes
    pub rate_updates: IntCounter,

    /// Notification rows committed
    pub notifications_recorded: IntCounter,

    /// Commit latency per transition
    pub transition_duration: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let transactions_created = IntCounter::new(
            "desk_transactions_created_total",
            "Transactions entering the book",
        )?;
        registry.register(Box::new(transactions_created.clone()))?;

        let transactions_approved = IntCounter::new(
            "desk_transactions_approved_total",
            "Approvals committed",
        )?;
        registry.register(Box::new(transactions_approved.clone()))?;

        let transactions_rejected = IntCounter::new(
            "desk_transactions_rejected_total",
            "Rejections committed",
        )?;
        registry.register(Box::new(transactions_rejected.clone()))?;

        let rate_updates = IntCounter::new("desk_rate_updates_total", "Daily rate writes")?;
        registry.register(Box::new(rate_updates.clone()))?;

        let notifications_recorded = IntCounter::new(
            "desk_notifications_recorded_total",
            "Notification rows committed",
        )?;
        registry.register(Box::new(notifications_recorded.clone()))?;

        let transition_duration = Histogram::with_opts(
            HistogramOpts::new(
                "desk_transition_duration_seconds",
                "Commit latency per transition",
            )
            .buckets(vec![0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0]),
        )?;
        registry.register(Box::new(transition_duration.clone()))?;

        Ok(Self {
            transactions_created,
            transactions_approved,
            transactions_rejected,
            rate_updates,
            notifications_recorded,
            transition_duration,
            registry,
        })
    }

    /// Record a transaction entering the book
    pub fn record_created(&self) {
        self.transactions_created.inc();
    }

    /// Record a committed decision
    pub fn record_decision(&self, status: TransactionStatus) {
        match status {
            TransactionStatus::Completed => self.transactions_approved.inc(),
            TransactionStatus::Rejected => self.transactions_rejected.inc(),
            TransactionStatus::Pending => {}
        }
    }

    /// Record a daily rate write
    pub fn record_rate_update(&self) {
        self.rate_updates.inc();
    }

    /// Record committed notification rows
    pub fn record_notifications(&self, count: usize) {
        self.notifications_recorded.inc_by(count as u64);
    }

    /// Record a transition commit latency
    pub fn record_transition_duration(&self, duration_seconds: f64) {
        self.transition_duration.observe(duration_seconds);
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.transactions_created.get(), 0);
        assert_eq!(metrics.rate_updates.get(), 0);
    }

    #[test]
    fn test_two_instances_coexist() {
        // Per-instance registries, so no duplicate registration
        let first = Metrics::new().unwrap();
        let second = Metrics::new().unwrap();

        first.record_created();
        assert_eq!(first.transactions_created.get(), 1);
        assert_eq!(second.transactions_created.get(), 0);
    }

    #[test]
    fn test_record_decision_by_status() {
        let metrics = Metrics::new().unwrap();

        metrics.record_decision(TransactionStatus::Completed);
        metrics.record_decision(TransactionStatus::Rejected);
        metrics.record_decision(TransactionStatus::Rejected);

        assert_eq!(metrics.transactions_approved.get(), 1);
        assert_eq!(metrics.transactions_rejected.get(), 2);
    }

    #[test]
    fn test_record_notifications_counts_rows() {
        let metrics = Metrics::new().unwrap();
        metrics.record_notifications(3);
        metrics.record_notifications(1);
        assert_eq!(metrics.notifications_recorded.get(), 4);
    }
}
