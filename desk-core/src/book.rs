//! Transaction book facade
//!
//! Ties storage, the single-writer actor and metrics together into the
//! high-level API the desk drives. Writes go through the actor; reads
//! are served from storage directly.
//!
//! # Example
//!
//! ```no_run
//! use desk_core::{CoreConfig, TransactionBook};
//!
//! #[tokio::main]
//! async fn main() -> desk_core::Result<()> {
//!     let config = CoreConfig::default();
//!     let book = TransactionBook::open(config).await?;
//!
//!     // let (tx, notifications) = book.create(request, audience).await?;
//!
//!     book.shutdown().await?;
//!     Ok(())
//! }
//! ```

use crate::{
    actor::{spawn_book_actor, BookHandle, CommitOutcome},
    metrics::Metrics,
    storage::{Storage, StorageStats},
    types::{
        ClientId, Decision, ExchangeTransaction, NewTransaction, NotificationRecord,
        TransactionStatus,
    },
    CoreConfig, Error, Result,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Main transaction book interface
pub struct TransactionBook {
    /// Actor handle for writes
    handle: BookHandle,

    /// Direct storage access (for reads)
    storage: Arc<Storage>,

    /// Metrics collector
    metrics: Arc<Metrics>,
}

impl TransactionBook {
    /// Open the book with configuration
    pub async fn open(config: CoreConfig) -> Result<Self> {
        let storage = Arc::new(Storage::open(&config)?);
        let metrics = Arc::new(
            Metrics::new().map_err(|e| Error::Config(format!("metrics setup failed: {}", e)))?,
        );
        let handle = spawn_book_actor(storage.clone());

        Ok(Self {
            handle,
            storage,
            metrics,
        })
    }

    /// Shared storage, for the sibling stores built over the same database
    pub fn storage(&self) -> Arc<Storage> {
        self.storage.clone()
    }

    /// Shared metrics collector
    pub fn metrics(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }

    /// Open a new pending transaction
    ///
    /// One announcement notification per audience member is committed
    /// atomically with the record and returned for dispatch.
    pub async fn create(
        &self,
        new: NewTransaction,
        audience: Vec<ClientId>,
    ) -> Result<CommitOutcome> {
        Self::validate_request(&new)?;

        let started = Instant::now();
        let outcome = self.handle.create(new, audience).await?;

        self.metrics.record_created();
        self.metrics.record_notifications(outcome.1.len());
        self.metrics
            .record_transition_duration(started.elapsed().as_secs_f64());

        Ok(outcome)
    }

    /// Settle a pending transaction
    pub async fn approve(&self, id: Uuid) -> Result<CommitOutcome> {
        self.decide(id, Decision::Approve).await
    }

    /// Refuse a pending transaction, reason stored as provided
    pub async fn reject(&self, id: Uuid, reason: Option<String>) -> Result<CommitOutcome> {
        self.decide(id, Decision::Reject { reason }).await
    }

    async fn decide(&self, id: Uuid, decision: Decision) -> Result<CommitOutcome> {
        let started = Instant::now();
        let outcome = self.handle.decide(id, decision).await?;

        self.metrics.record_decision(outcome.0.status);
        self.metrics.record_notifications(outcome.1.len());
        self.metrics
            .record_transition_duration(started.elapsed().as_secs_f64());

        Ok(outcome)
    }

    /// Get a transaction by ID
    pub fn transaction(&self, id: Uuid) -> Result<ExchangeTransaction> {
        self.storage.get_transaction(id)
    }

    /// A client's transactions, newest first
    pub fn transactions_for_owner(&self, owner: &ClientId) -> Result<Vec<ExchangeTransaction>> {
        self.storage.transactions_for_owner(owner)
    }

    /// Transactions holding a status, newest first
    pub fn transactions_by_status(
        &self,
        status: TransactionStatus,
    ) -> Result<Vec<ExchangeTransaction>> {
        self.storage.transactions_by_status(status)
    }

    /// A client's notifications, newest first
    pub fn notifications_for(&self, recipient: &ClientId) -> Result<Vec<NotificationRecord>> {
        self.storage.notifications_for_recipient(recipient)
    }

    /// Mark a notification read
    pub fn mark_notification_read(&self, id: Uuid) -> Result<NotificationRecord> {
        let mut notification = self.storage.get_notification(id)?;
        notification.read = true;
        self.storage.put_notification(&notification)?;
        Ok(notification)
    }

    /// Get storage statistics
    pub fn stats(&self) -> Result<StorageStats> {
        self.storage.get_stats()
    }

    /// Shutdown the book
    pub async fn shutdown(self) -> Result<()> {
        self.handle.shutdown().await
    }

    /// Guard the book against malformed requests
    ///
    /// Quotes produce positive legs, so anything else points at a
    /// caller bug.
    fn validate_request(new: &NewTransaction) -> Result<()> {
        if new.amount_xaf <= Decimal::ZERO {
            return Err(Error::InvalidRequest(
                "XAF amount must be positive".to_string(),
            ));
        }
        if new.amount_usdt <= Decimal::ZERO {
            return Err(Error::InvalidRequest(
                "USDT amount must be positive".to_string(),
            ));
        }
        if new.applied_rate <= Decimal::ZERO {
            return Err(Error::InvalidRequest(
                "Applied rate must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
