//! Administrator directory
//!
//! Decisions and rate or wallet changes are restricted to active
//! administrators. The directory is a trait so deployments can back it
//! with whatever identity store they run; the built-in implementation
//! reads a fixed list from configuration.

use async_trait::async_trait;
use desk_core::types::ClientId;

/// Resolves who may administer the desk and who hears about new
/// transactions
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Whether the client may perform administrative operations
    async fn is_active_admin(&self, client: &ClientId) -> bool;

    /// Clients notified when a transaction enters the book
    async fn admin_audience(&self) -> Vec<ClientId>;
}

/// Directory backed by a fixed list from configuration
#[derive(Debug, Clone)]
pub struct StaticDirectory {
    admins: Vec<ClientId>,
}

impl StaticDirectory {
    /// Build from administrator IDs
    pub fn new(admins: Vec<ClientId>) -> Self {
        Self { admins }
    }
}

#[async_trait]
impl UserDirectory for StaticDirectory {
    async fn is_active_admin(&self, client: &ClientId) -> bool {
        self.admins.contains(client)
    }

    async fn admin_audience(&self) -> Vec<ClientId> {
        self.admins.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_directory_membership() {
        let directory = StaticDirectory::new(vec![
            ClientId::new("admin-1"),
            ClientId::new("admin-2"),
        ]);

        assert!(directory.is_active_admin(&ClientId::new("admin-1")).await);
        assert!(!directory.is_active_admin(&ClientId::new("client-1")).await);
        assert_eq!(directory.admin_audience().await.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_directory_authorizes_nobody() {
        let directory = StaticDirectory::new(vec![]);

        assert!(!directory.is_active_admin(&ClientId::new("admin-1")).await);
        assert!(directory.admin_audience().await.is_empty());
    }
}
