//! Actor-based concurrency for the transaction book
//!
//! All writes to the book flow through one actor task, so every
//! read-verify-write transition is serialized: two racing decisions on
//! the same transaction cannot both pass the pending check. Reads stay
//! on the caller side against storage directly.
//!
//! Each handled message commits a single atomic write batch holding the
//! transaction record, its index changes and the notification rows the
//! transition produced. The caller receives the committed transaction
//! together with those rows for post-commit dispatch.

use crate::storage::Storage;
use crate::types::{
    ClientId, Decision, EventKind, ExchangeTransaction, NewTransaction, NotificationRecord,
};
use crate::{Error, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

/// Outcome of a committed write: the transaction and the notification
/// rows persisted with it
pub type CommitOutcome = (ExchangeTransaction, Vec<NotificationRecord>);

/// Message sent to the book actor
pub enum BookMessage {
    /// Open a new pending transaction
    Create {
        /// Request payload
        new: NewTransaction,
        /// Admin recipients of the announcement notification
        audience: Vec<ClientId>,
        /// Response channel
        response: oneshot::Sender<Result<CommitOutcome>>,
    },

    /// Apply a terminal decision to a pending transaction
    Decide {
        /// Transaction to decide
        id: Uuid,
        /// Approve or reject
        decision: Decision,
        /// Response channel
        response: oneshot::Sender<Result<CommitOutcome>>,
    },

    /// Shutdown actor
    Shutdown,
}

/// Actor that serializes writes to the book
pub struct BookActor {
    /// Storage backend
    storage: Arc<Storage>,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<BookMessage>,
}

impl BookActor {
    /// Create new actor
    pub fn new(storage: Arc<Storage>, mailbox: mpsc::Receiver<BookMessage>) -> Self {
        Self { storage, mailbox }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.mailbox.recv().await {
            match msg {
                BookMessage::Shutdown => break,
                other => self.handle_message(other),
            }
        }

        tracing::debug!("Book actor stopped");
    }

    /// Handle a single message
    fn handle_message(&mut self, msg: BookMessage) {
        match msg {
            BookMessage::Create {
                new,
                audience,
                response,
            } => {
                let _ = response.send(self.handle_create(new, &audience));
            }

            BookMessage::Decide {
                id,
                decision,
                response,
            } => {
                let _ = response.send(self.handle_decide(id, decision));
            }

            BookMessage::Shutdown => {
                // Handled in main loop
            }
        }
    }

    fn handle_create(&self, new: NewTransaction, audience: &[ClientId]) -> Result<CommitOutcome> {
        let tx = ExchangeTransaction::create(new);

        let notifications: Vec<NotificationRecord> = audience
            .iter()
            .map(|admin| {
                NotificationRecord::new(
                    admin.clone(),
                    EventKind::NewTransaction,
                    tx.creation_message(),
                    tx.id,
                )
            })
            .collect();

        self.storage.create_transaction(&tx, &notifications)?;

        Ok((tx, notifications))
    }

    fn handle_decide(&self, id: Uuid, decision: Decision) -> Result<CommitOutcome> {
        let mut tx = self.storage.get_transaction(id)?;
        let previous_status = tx.status;

        tx.apply_decision(&decision)?;

        let notification = NotificationRecord::new(
            tx.owner.clone(),
            decision.event_kind(),
            decision.client_message(&tx),
            tx.id,
        );
        let notifications = vec![notification];

        self.storage
            .decide_transaction(&tx, previous_status, &notifications)?;

        Ok((tx, notifications))
    }
}

/// Handle for sending messages to the actor
#[derive(Clone)]
pub struct BookHandle {
    sender: mpsc::Sender<BookMessage>,
}

impl BookHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<BookMessage>) -> Self {
        Self { sender }
    }

    /// Open a new pending transaction
    pub async fn create(
        &self,
        new: NewTransaction,
        audience: Vec<ClientId>,
    ) -> Result<CommitOutcome> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(BookMessage::Create {
                new,
                audience,
                response: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Apply a terminal decision
    pub async fn decide(&self, id: Uuid, decision: Decision) -> Result<CommitOutcome> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(BookMessage::Decide {
                id,
                decision,
                response: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Shutdown actor
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(BookMessage::Shutdown)
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;
        Ok(())
    }
}

/// Spawn the book actor
pub fn spawn_book_actor(storage: Arc<Storage>) -> BookHandle {
    let (tx, rx) = mpsc::channel(1000); // Bounded channel for backpressure
    let actor = BookActor::new(storage, rx);

    tokio::spawn(async move {
        actor.run().await;
    });

    BookHandle::new(tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;
    use crate::CoreConfig;
    use rust_decimal::Decimal;

    fn test_storage() -> (Arc<Storage>, tempfile::TempDir) {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = CoreConfig::default();
        config.data_dir = temp_dir.path().to_path_buf();
        (Arc::new(Storage::open(&config).unwrap()), temp_dir)
    }

    fn test_request() -> NewTransaction {
        NewTransaction {
            owner: ClientId::new("client-1"),
            direction: Direction::Buy,
            amount_xaf: Decimal::from(100_000),
            amount_usdt: Decimal::new(16327, 2),
            applied_rate: Decimal::new(61248, 2),
            network: "TRC20".to_string(),
            mobile_operator: Some("MTN".to_string()),
            counterparty_wallet: "TAddr1".to_string(),
            settlement_destination: "677000111".to_string(),
        }
    }

    #[tokio::test]
    async fn test_actor_spawn_and_shutdown() {
        let (storage, _temp) = test_storage();
        let handle = spawn_book_actor(storage);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_create_notifies_whole_audience() {
        let (storage, _temp) = test_storage();
        let handle = spawn_book_actor(storage);

        let audience = vec![ClientId::new("admin-1"), ClientId::new("admin-2")];
        let (tx, notifications) = handle.create(test_request(), audience).await.unwrap();

        assert_eq!(notifications.len(), 2);
        assert!(notifications.iter().all(|n| n.transaction_id == tx.id));
        assert!(notifications
            .iter()
            .all(|n| n.kind == EventKind::NewTransaction));

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_second_decision_refused() {
        let (storage, _temp) = test_storage();
        let handle = spawn_book_actor(storage.clone());

        let (tx, _) = handle
            .create(test_request(), vec![ClientId::new("admin-1")])
            .await
            .unwrap();

        let (approved, notifications) = handle.decide(tx.id, Decision::Approve).await.unwrap();
        assert_eq!(approved.status, crate::TransactionStatus::Completed);
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].recipient, tx.owner);

        let second = handle
            .decide(
                tx.id,
                Decision::Reject {
                    reason: Some("late".to_string()),
                },
            )
            .await;
        assert!(matches!(second, Err(Error::InvalidTransition { .. })));

        // State unchanged after the refused decision
        let stored = storage.get_transaction(tx.id).unwrap();
        assert_eq!(stored.status, crate::TransactionStatus::Completed);
        assert!(stored.rejection_reason.is_none());

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_decide_unknown_transaction() {
        let (storage, _temp) = test_storage();
        let handle = spawn_book_actor(storage);

        let result = handle.decide(Uuid::now_v7(), Decision::Approve).await;
        assert!(matches!(result, Err(Error::TransactionNotFound(_))));

        handle.shutdown().await.unwrap();
    }
}
