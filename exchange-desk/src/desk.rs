//! Main exchange desk
//!
//! Composes the pricing engine, the rate store, the wallet directory
//! and the transaction book into the desk-facing operations. Quotes
//! always price against today's rate; submissions snapshot the quoted
//! legs so later rate changes never move an open transaction.

use crate::{
    config::Config,
    directory::{StaticDirectory, UserDirectory},
    notify::{Notifier, TracingNotifier},
    Error, Result,
};
use chrono::{NaiveDate, Utc};
use desk_core::{
    metrics::Metrics,
    storage::StorageStats,
    types::{
        ClientId, Direction, ExchangeRate, ExchangeTransaction, NewTransaction,
        NotificationRecord, TransactionStatus, WalletKind, WalletRecord,
    },
    CoreConfig, RateStore, TransactionBook, WalletDirectory,
};
use pricing_engine::{BuyQuote, PricingEngine, SellQuote};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// Exchange desk
pub struct ExchangeDesk {
    /// Transaction book
    book: TransactionBook,

    /// Daily rate store
    rates: RateStore,

    /// Settlement wallet directory
    wallets: WalletDirectory,

    /// Quote engine
    pricing: PricingEngine,

    /// Administrator directory
    directory: Arc<dyn UserDirectory>,

    /// Delivery channel for committed notifications
    notifier: Arc<dyn Notifier>,

    /// Absolute XAF-per-USDT spread on top of the daily rates
    margin_xaf: Decimal,
}

/// Calendar date quotes price against
fn today() -> NaiveDate {
    Utc::now().date_naive()
}

impl ExchangeDesk {
    /// Open the desk with configuration
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;

        tracing::info!(
            service = %config.service_name,
            version = %config.service_version,
            "Opening exchange desk"
        );

        let core_config = CoreConfig {
            data_dir: config.core_data_dir.clone(),
            ..Default::default()
        };
        let book = TransactionBook::open(core_config).await?;

        let rates = RateStore::new(book.storage(), book.metrics());
        let wallets = WalletDirectory::new(book.storage());

        let directory: Arc<dyn UserDirectory> = Arc::new(StaticDirectory::new(
            config
                .directory
                .admins
                .into_iter()
                .map(ClientId::new)
                .collect(),
        ));

        Ok(Self {
            book,
            rates,
            wallets,
            pricing: PricingEngine::new(),
            directory,
            notifier: Arc::new(TracingNotifier),
            margin_xaf: config.pricing.margin_xaf,
        })
    }

    /// Replace the notification channel
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Replace the administrator directory
    pub fn with_directory(mut self, directory: Arc<dyn UserDirectory>) -> Self {
        self.directory = directory;
        self
    }

    /// Quote a client buying USDT with XAF
    ///
    /// A buy is the desk selling, so it prices on the sell schedule
    /// against today's sell rate.
    pub fn quote_buy(&self, amount_xaf: Decimal) -> Result<SellQuote> {
        let rate = self.rates.current_rate(today())?;
        Ok(self
            .pricing
            .price_sell(amount_xaf, rate.sell_rate, self.margin_xaf)?)
    }

    /// Quote a client selling USDT for XAF
    ///
    /// A sell is the desk buying, so it prices on the buy schedule
    /// against today's buy rate.
    pub fn quote_sell(&self, amount_usdt: Decimal) -> Result<BuyQuote> {
        let rate = self.rates.current_rate(today())?;
        Ok(self
            .pricing
            .price_buy(amount_usdt, rate.buy_rate, self.margin_xaf)?)
    }

    /// Open a buy transaction
    ///
    /// The client pays `amount_xaf` through the allocated mobile-money
    /// destination and receives USDT on `usdt_address`. The quote legs
    /// and the destination are snapshotted into the pending record.
    pub async fn submit_buy(
        &self,
        owner: ClientId,
        amount_xaf: Decimal,
        network: &str,
        operator: Option<&str>,
        country: Option<&str>,
        usdt_address: &str,
    ) -> Result<ExchangeTransaction> {
        let quote = self.quote_buy(amount_xaf)?;
        let destination = self.wallets.allocate_for_buy(operator, country)?;

        let new = NewTransaction {
            owner,
            direction: Direction::Buy,
            amount_xaf: quote.amount_xaf,
            amount_usdt: quote.usdt_out,
            applied_rate: quote.effective_rate,
            network: network.to_string(),
            mobile_operator: operator.map(str::to_string),
            counterparty_wallet: usdt_address.to_string(),
            settlement_destination: destination.destination,
        };

        let audience = self.directory.admin_audience().await;
        let (tx, notifications) = self.book.create(new, audience).await?;

        tracing::info!(
            transaction_id = %tx.id,
            owner = %tx.owner,
            amount_xaf = %tx.amount_xaf,
            amount_usdt = %tx.amount_usdt,
            "Buy request opened"
        );

        self.dispatch(&notifications).await;
        Ok(tx)
    }

    /// Open a sell transaction
    ///
    /// The client sends `amount_usdt` on `network` to the allocated
    /// crypto destination and receives XAF on `payout_number`.
    pub async fn submit_sell(
        &self,
        owner: ClientId,
        amount_usdt: Decimal,
        network: &str,
        payout_number: &str,
    ) -> Result<ExchangeTransaction> {
        let quote = self.quote_sell(amount_usdt)?;
        let destination = self.wallets.allocate_for_sell(network)?;

        let new = NewTransaction {
            owner,
            direction: Direction::Sell,
            amount_xaf: quote.xaf_out,
            amount_usdt: quote.amount_usdt,
            applied_rate: quote.effective_rate,
            network: network.to_string(),
            mobile_operator: None,
            counterparty_wallet: payout_number.to_string(),
            settlement_destination: destination.destination,
        };

        let audience = self.directory.admin_audience().await;
        let (tx, notifications) = self.book.create(new, audience).await?;

        tracing::info!(
            transaction_id = %tx.id,
            owner = %tx.owner,
            amount_usdt = %tx.amount_usdt,
            amount_xaf = %tx.amount_xaf,
            "Sell request opened"
        );

        self.dispatch(&notifications).await;
        Ok(tx)
    }

    /// Settle a pending transaction
    pub async fn approve(&self, actor: &ClientId, id: Uuid) -> Result<ExchangeTransaction> {
        self.authorize(actor).await?;

        let (tx, notifications) = self.book.approve(id).await?;
        tracing::info!(transaction_id = %id, actor = %actor, "Transaction approved");

        self.dispatch(&notifications).await;
        Ok(tx)
    }

    /// Refuse a pending transaction
    pub async fn reject(
        &self,
        actor: &ClientId,
        id: Uuid,
        reason: Option<String>,
    ) -> Result<ExchangeTransaction> {
        self.authorize(actor).await?;

        let (tx, notifications) = self.book.reject(id, reason).await?;
        tracing::info!(transaction_id = %id, actor = %actor, "Transaction rejected");

        self.dispatch(&notifications).await;
        Ok(tx)
    }

    /// Create or replace the rate row for a date
    pub async fn set_rate(
        &self,
        actor: &ClientId,
        date: NaiveDate,
        buy_rate: Decimal,
        sell_rate: Decimal,
    ) -> Result<ExchangeRate> {
        self.authorize(actor).await?;
        Ok(self.rates.set_rate(date, buy_rate, sell_rate)?)
    }

    /// Most recent rate row by date
    pub fn latest_rate(&self) -> Result<Option<ExchangeRate>> {
        Ok(self.rates.latest_rate()?)
    }

    /// All rate rows, newest first
    pub fn list_rates(&self) -> Result<Vec<ExchangeRate>> {
        Ok(self.rates.list_rates()?)
    }

    /// Register a settlement wallet
    pub async fn add_wallet(
        &self,
        actor: &ClientId,
        kind: WalletKind,
        network: &str,
        destination: &str,
        country: Option<String>,
    ) -> Result<WalletRecord> {
        self.authorize(actor).await?;
        Ok(self.wallets.add(kind, network, destination, country)?)
    }

    /// Activate or retire a settlement wallet
    pub async fn set_wallet_active(
        &self,
        actor: &ClientId,
        id: Uuid,
        active: bool,
    ) -> Result<WalletRecord> {
        self.authorize(actor).await?;
        Ok(self.wallets.set_active(id, active)?)
    }

    /// All settlement wallets in registration order
    pub async fn list_wallets(&self, actor: &ClientId) -> Result<Vec<WalletRecord>> {
        self.authorize(actor).await?;
        Ok(self.wallets.list()?)
    }

    /// The review queue, newest first
    pub async fn pending_transactions(
        &self,
        actor: &ClientId,
    ) -> Result<Vec<ExchangeTransaction>> {
        self.authorize(actor).await?;
        Ok(self.book.transactions_by_status(TransactionStatus::Pending)?)
    }

    /// Get a transaction by ID
    pub fn transaction(&self, id: Uuid) -> Result<ExchangeTransaction> {
        Ok(self.book.transaction(id)?)
    }

    /// A client's transactions, newest first
    pub fn transactions_for(&self, owner: &ClientId) -> Result<Vec<ExchangeTransaction>> {
        Ok(self.book.transactions_for_owner(owner)?)
    }

    /// A client's notifications, newest first
    pub fn notifications_for(&self, recipient: &ClientId) -> Result<Vec<NotificationRecord>> {
        Ok(self.book.notifications_for(recipient)?)
    }

    /// Mark a notification read
    pub fn mark_notification_read(&self, id: Uuid) -> Result<NotificationRecord> {
        Ok(self.book.mark_notification_read(id)?)
    }

    /// Shared metrics collector
    pub fn metrics(&self) -> Arc<Metrics> {
        self.book.metrics()
    }

    /// Storage statistics
    pub fn stats(&self) -> Result<StorageStats> {
        Ok(self.book.stats()?)
    }

    /// Shutdown the desk
    pub async fn shutdown(self) -> Result<()> {
        tracing::info!("Shutting down exchange desk");
        self.book.shutdown().await?;
        Ok(())
    }

    async fn authorize(&self, actor: &ClientId) -> Result<()> {
        if !self.directory.is_active_admin(actor).await {
            return Err(Error::Unauthorized(actor.clone()));
        }
        Ok(())
    }

    /// Best-effort delivery of committed notifications
    ///
    /// Failures are logged, never propagated: the records are already
    /// durable and visible through the recipient's inbox.
    async fn dispatch(&self, notifications: &[NotificationRecord]) {
        for notification in notifications {
            if let Err(e) = self.notifier.deliver(notification).await {
                tracing::warn!(
                    notification_id = %notification.id,
                    recipient = %notification.recipient,
                    error = %e,
                    "Notification delivery failed"
                );
            }
        }
    }
}
