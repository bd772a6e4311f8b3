//! Settlement wallet directory and allocation
//!
//! The desk owns a pool of crypto addresses and mobile-money merchant
//! numbers. Allocation is a read-only first-match scan in insertion
//! order (UUIDv7 keys), so the same active set always yields the same
//! pick. Wallets are retired by deactivation, never deleted.

use crate::{
    storage::Storage,
    types::{WalletKind, WalletRecord},
    Error, Result,
};
use std::sync::Arc;
use uuid::Uuid;

/// Directory of administrative settlement destinations
pub struct WalletDirectory {
    storage: Arc<Storage>,
}

impl WalletDirectory {
    /// Create a directory over shared storage
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    /// Register a new active wallet
    pub fn add(
        &self,
        kind: WalletKind,
        network: impl Into<String>,
        destination: impl Into<String>,
        country: Option<String>,
    ) -> Result<WalletRecord> {
        let wallet = WalletRecord::new(kind, network, destination, country);
        self.storage.put_wallet(&wallet)?;

        tracing::info!(
            wallet_id = %wallet.id,
            kind = wallet.kind.as_str(),
            network = %wallet.network,
            "Wallet registered"
        );

        Ok(wallet)
    }

    /// Activate or retire a wallet
    pub fn set_active(&self, id: Uuid, active: bool) -> Result<WalletRecord> {
        let mut wallet = self.storage.get_wallet(id)?;
        wallet.active = active;
        self.storage.put_wallet(&wallet)?;

        tracing::info!(wallet_id = %id, active, "Wallet activity changed");

        Ok(wallet)
    }

    /// Get a wallet by ID
    pub fn get(&self, id: Uuid) -> Result<WalletRecord> {
        self.storage.get_wallet(id)
    }

    /// List all wallets in insertion order
    pub fn list(&self) -> Result<Vec<WalletRecord>> {
        self.storage.list_wallets()
    }

    /// Destination for a buy: the first active mobile-money wallet,
    /// optionally narrowed to an operator and country
    pub fn allocate_for_buy(
        &self,
        operator: Option<&str>,
        country: Option<&str>,
    ) -> Result<WalletRecord> {
        for wallet in self.storage.list_wallets()? {
            if wallet.kind != WalletKind::MobileMoney || !wallet.active {
                continue;
            }
            if let Some(op) = operator {
                if wallet.network != op {
                    continue;
                }
            }
            if let Some(c) = country {
                if wallet.country.as_deref() != Some(c) {
                    continue;
                }
            }
            return Ok(wallet);
        }

        Err(Error::NoDestinationAvailable(format!(
            "mobile money, operator {}, country {}",
            operator.unwrap_or("any"),
            country.unwrap_or("any")
        )))
    }

    /// Destination for a sell: the first active crypto wallet on the
    /// requested network
    pub fn allocate_for_sell(&self, network: &str) -> Result<WalletRecord> {
        for wallet in self.storage.list_wallets()? {
            if wallet.kind == WalletKind::Crypto && wallet.active && wallet.network == network {
                return Ok(wallet);
            }
        }

        Err(Error::NoDestinationAvailable(format!(
            "crypto network {}",
            network
        )))
    }
}
