//! Notification dispatch
//!
//! Notification records are committed in the same write batch as the
//! transaction change they describe; dispatch happens after the commit
//! and is best-effort. The stored inbox stays authoritative when a
//! delivery fails.

use crate::Result;
use async_trait::async_trait;
use desk_core::types::NotificationRecord;

/// Delivery channel for committed notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification
    async fn deliver(&self, notification: &NotificationRecord) -> Result<()>;
}

/// Notifier that writes deliveries to the log
///
/// Stands in where no push channel is wired up; recipients still see
/// everything through their stored inbox.
#[derive(Debug, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn deliver(&self, notification: &NotificationRecord) -> Result<()> {
        tracing::info!(
            notification_id = %notification.id,
            recipient = %notification.recipient,
            kind = %notification.kind,
            "{}",
            notification.message
        );
        Ok(())
    }
}
