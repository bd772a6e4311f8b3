//! Storage layer using RocksDB
//!
//! # Column Families
//!
//! - `rates` - Daily exchange rates (key: ISO date string)
//! - `wallets` - Settlement wallets (key: wallet_id)
//! - `transactions` - Exchange transactions (key: transaction_id)
//! - `notifications` - Lifecycle notifications (key: notification_id)
//! - `indices` - Secondary indices for owner, status and recipient scans
//!
//! Transaction creation and decision each commit as one `WriteBatch`
//! carrying the record, its index keys and the paired notification rows.

use crate::{
    error::{Error, Result},
    types::{
        ClientId, ExchangeRate, ExchangeTransaction, NotificationRecord, TransactionStatus,
        WalletRecord,
    },
    CoreConfig,
};
use chrono::NaiveDate;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBCompactionStyle, IteratorMode, Options,
    WriteBatch, DB,
};
use std::sync::Arc;
use uuid::Uuid;

/// Column family names
const CF_RATES: &str = "rates";
const CF_WALLETS: &str = "wallets";
const CF_TRANSACTIONS: &str = "transactions";
const CF_NOTIFICATIONS: &str = "notifications";
const CF_INDICES: &str = "indices";

/// Index key namespaces within `indices`
const IDX_OWNER: &[u8] = b"own|";
const IDX_STATUS: &[u8] = b"sts|";
const IDX_RECIPIENT: &[u8] = b"rcp|";

/// Storage wrapper for RocksDB
pub struct Storage {
    db: Arc<DB>,
}

impl Storage {
    /// Open or create database
    pub fn open(config: &CoreConfig) -> Result<Self> {
        let path = &config.data_dir;

        // Create directory if not exists
        std::fs::create_dir_all(path)?;

        // Database options
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        // Tuning from config
        db_opts.set_write_buffer_size(config.rocksdb.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_write_buffer_number(config.rocksdb.max_write_buffer_number);
        db_opts.set_target_file_size_base(config.rocksdb.target_file_size_mb * 1024 * 1024);
        db_opts.set_max_background_jobs(config.rocksdb.max_background_jobs);

        // Universal compaction for write-heavy workload
        db_opts.set_compaction_style(DBCompactionStyle::Universal);

        if config.rocksdb.enable_statistics {
            db_opts.enable_statistics();
        }

        // Column family descriptors
        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_RATES, Self::cf_options_rates()),
            ColumnFamilyDescriptor::new(CF_WALLETS, Self::cf_options_wallets()),
            ColumnFamilyDescriptor::new(CF_TRANSACTIONS, Self::cf_options_transactions()),
            ColumnFamilyDescriptor::new(CF_NOTIFICATIONS, Self::cf_options_notifications()),
            ColumnFamilyDescriptor::new(CF_INDICES, Self::cf_options_indices()),
        ];

        // Open database
        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        tracing::info!(path = %path.display(), "Opened RocksDB for the transaction book");

        Ok(Self { db: Arc::new(db) })
    }

    // Column family options

    fn cf_options_rates() -> Options {
        let mut opts = Options::default();
        // Tiny, frequently read
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }

    fn cf_options_wallets() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }

    fn cf_options_transactions() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
        opts.set_bottommost_compression_type(rocksdb::DBCompressionType::Zstd);
        opts
    }

    fn cf_options_notifications() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
        opts
    }

    fn cf_options_indices() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        // Indices benefit from bloom filters
        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false); // 10 bits per key
        opts.set_block_based_table_factory(&block_opts);
        opts
    }

    // Helper: get column family handle

    fn cf_handle(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| Error::Storage(format!("Column family {} not found", name)))
    }

    // Rate operations

    /// Create or replace the rate row for its effective date
    pub fn put_rate(&self, rate: &ExchangeRate) -> Result<()> {
        let cf = self.cf_handle(CF_RATES)?;
        let key = Self::rate_key(rate.effective_date);
        let value = bincode::serialize(rate)?;

        self.db.put_cf(&cf, key, &value)?;

        tracing::info!(
            effective_date = %rate.effective_date,
            buy_rate = %rate.buy_rate,
            sell_rate = %rate.sell_rate,
            "Rate stored"
        );

        Ok(())
    }

    /// Get the rate row for an exact date, if one was ever set
    pub fn get_rate(&self, date: NaiveDate) -> Result<Option<ExchangeRate>> {
        let cf = self.cf_handle(CF_RATES)?;
        let key = Self::rate_key(date);

        match self.db.get_cf(&cf, key)? {
            Some(value) => Ok(Some(bincode::deserialize(&value)?)),
            None => Ok(None),
        }
    }

    /// Get the most recent rate row by date
    pub fn latest_rate(&self) -> Result<Option<ExchangeRate>> {
        let cf = self.cf_handle(CF_RATES)?;

        // ISO date keys sort chronologically, so the last key is newest
        let iter = self.db.iterator_cf(&cf, IteratorMode::End);
        for item in iter {
            let (_, value) = item?;
            return Ok(Some(bincode::deserialize(&value)?));
        }

        Ok(None)
    }

    /// List all rate rows, newest first
    pub fn list_rates(&self) -> Result<Vec<ExchangeRate>> {
        let cf = self.cf_handle(CF_RATES)?;

        let mut rates = Vec::new();
        let iter = self.db.iterator_cf(&cf, IteratorMode::End);
        for item in iter {
            let (_, value) = item?;
            rates.push(bincode::deserialize(&value)?);
        }

        Ok(rates)
    }

    // Wallet operations

    /// Create or update a wallet record
    pub fn put_wallet(&self, wallet: &WalletRecord) -> Result<()> {
        let cf = self.cf_handle(CF_WALLETS)?;
        let value = bincode::serialize(wallet)?;

        self.db.put_cf(&cf, wallet.id.as_bytes(), &value)?;

        Ok(())
    }

    /// Get a wallet by ID
    pub fn get_wallet(&self, id: Uuid) -> Result<WalletRecord> {
        let cf = self.cf_handle(CF_WALLETS)?;

        let value = self
            .db
            .get_cf(&cf, id.as_bytes())?
            .ok_or(Error::WalletNotFound(id))?;

        Ok(bincode::deserialize(&value)?)
    }

    /// List wallets in insertion order (UUIDv7 keys sort by time)
    pub fn list_wallets(&self) -> Result<Vec<WalletRecord>> {
        let cf = self.cf_handle(CF_WALLETS)?;

        let mut wallets = Vec::new();
        let iter = self.db.iterator_cf(&cf, IteratorMode::Start);
        for item in iter {
            let (_, value) = item?;
            wallets.push(bincode::deserialize(&value)?);
        }

        Ok(wallets)
    }

    // Transaction operations

    /// Get a transaction by ID
    pub fn get_transaction(&self, id: Uuid) -> Result<ExchangeTransaction> {
        let cf = self.cf_handle(CF_TRANSACTIONS)?;

        let value = self
            .db
            .get_cf(&cf, id.as_bytes())?
            .ok_or(Error::TransactionNotFound(id))?;

        Ok(bincode::deserialize(&value)?)
    }

    /// Persist a new transaction with its indices and notifications (atomic)
    pub fn create_transaction(
        &self,
        tx: &ExchangeTransaction,
        notifications: &[NotificationRecord],
    ) -> Result<()> {
        let mut batch = WriteBatch::default();

        // 1. Transaction record
        let cf_tx = self.cf_handle(CF_TRANSACTIONS)?;
        batch.put_cf(&cf_tx, tx.id.as_bytes(), &bincode::serialize(tx)?);

        // 2. Indices
        let cf_indices = self.cf_handle(CF_INDICES)?;
        batch.put_cf(&cf_indices, Self::index_key_owner(&tx.owner, tx.id), []);
        batch.put_cf(&cf_indices, Self::index_key_status(tx.status, tx.id), []);

        // 3. Notifications with their recipient indices
        self.stage_notifications(&mut batch, notifications)?;

        // Atomic commit
        self.db.write(batch)?;

        tracing::debug!(
            transaction_id = %tx.id,
            owner = %tx.owner,
            direction = %tx.direction,
            "Transaction created"
        );

        Ok(())
    }

    /// Persist a decided transaction, swapping its status index (atomic)
    pub fn decide_transaction(
        &self,
        tx: &ExchangeTransaction,
        previous_status: TransactionStatus,
        notifications: &[NotificationRecord],
    ) -> Result<()> {
        let mut batch = WriteBatch::default();

        // 1. Transaction record overwrite
        let cf_tx = self.cf_handle(CF_TRANSACTIONS)?;
        batch.put_cf(&cf_tx, tx.id.as_bytes(), &bincode::serialize(tx)?);

        // 2. Status index swap
        let cf_indices = self.cf_handle(CF_INDICES)?;
        batch.delete_cf(&cf_indices, Self::index_key_status(previous_status, tx.id));
        batch.put_cf(&cf_indices, Self::index_key_status(tx.status, tx.id), []);

        // 3. Notifications with their recipient indices
        self.stage_notifications(&mut batch, notifications)?;

        // Atomic commit
        self.db.write(batch)?;

        tracing::debug!(
            transaction_id = %tx.id,
            status = %tx.status,
            "Transaction decided"
        );

        Ok(())
    }

    /// List a client's transactions, newest first
    pub fn transactions_for_owner(&self, owner: &ClientId) -> Result<Vec<ExchangeTransaction>> {
        let prefix = Self::index_prefix_owner(owner);
        let ids = self.scan_index_ids(&prefix)?;

        let mut txs = Vec::with_capacity(ids.len());
        for id in ids {
            txs.push(self.get_transaction(id)?);
        }

        // Forward scan yields oldest first
        txs.reverse();
        Ok(txs)
    }

    /// List transactions holding a status, newest first
    pub fn transactions_by_status(
        &self,
        status: TransactionStatus,
    ) -> Result<Vec<ExchangeTransaction>> {
        let prefix = Self::index_prefix_status(status);
        let ids = self.scan_index_ids(&prefix)?;

        let mut txs = Vec::with_capacity(ids.len());
        for id in ids {
            txs.push(self.get_transaction(id)?);
        }

        txs.reverse();
        Ok(txs)
    }

    // Notification operations

    /// Get a notification by ID
    pub fn get_notification(&self, id: Uuid) -> Result<NotificationRecord> {
        let cf = self.cf_handle(CF_NOTIFICATIONS)?;

        let value = self
            .db
            .get_cf(&cf, id.as_bytes())?
            .ok_or(Error::NotificationNotFound(id))?;

        Ok(bincode::deserialize(&value)?)
    }

    /// Overwrite a notification record (read flag updates)
    pub fn put_notification(&self, notification: &NotificationRecord) -> Result<()> {
        let cf = self.cf_handle(CF_NOTIFICATIONS)?;
        let value = bincode::serialize(notification)?;

        self.db.put_cf(&cf, notification.id.as_bytes(), &value)?;

        Ok(())
    }

    /// List a client's notifications, newest first
    pub fn notifications_for_recipient(
        &self,
        recipient: &ClientId,
    ) -> Result<Vec<NotificationRecord>> {
        let prefix = Self::index_prefix_recipient(recipient);
        let ids = self.scan_index_ids(&prefix)?;

        let mut notifications = Vec::with_capacity(ids.len());
        for id in ids {
            notifications.push(self.get_notification(id)?);
        }

        notifications.reverse();
        Ok(notifications)
    }

    // Batch helpers

    fn stage_notifications(
        &self,
        batch: &mut WriteBatch,
        notifications: &[NotificationRecord],
    ) -> Result<()> {
        let cf_notif = self.cf_handle(CF_NOTIFICATIONS)?;
        let cf_indices = self.cf_handle(CF_INDICES)?;

        for notification in notifications {
            batch.put_cf(
                &cf_notif,
                notification.id.as_bytes(),
                &bincode::serialize(notification)?,
            );
            batch.put_cf(
                &cf_indices,
                Self::index_key_recipient(&notification.recipient, notification.id),
                [],
            );
        }

        Ok(())
    }

    // Index key helpers

    fn rate_key(date: NaiveDate) -> Vec<u8> {
        date.to_string().into_bytes()
    }

    fn index_prefix_owner(owner: &ClientId) -> Vec<u8> {
        let mut key = IDX_OWNER.to_vec();
        key.extend_from_slice(owner.as_str().as_bytes());
        key.push(b'|');
        key
    }

    fn index_key_owner(owner: &ClientId, tx_id: Uuid) -> Vec<u8> {
        let mut key = Self::index_prefix_owner(owner);
        key.extend_from_slice(tx_id.as_bytes());
        key
    }

    fn index_prefix_status(status: TransactionStatus) -> Vec<u8> {
        let mut key = IDX_STATUS.to_vec();
        key.push(status as u8);
        key
    }

    fn index_key_status(status: TransactionStatus, tx_id: Uuid) -> Vec<u8> {
        let mut key = Self::index_prefix_status(status);
        key.extend_from_slice(tx_id.as_bytes());
        key
    }

    fn index_prefix_recipient(recipient: &ClientId) -> Vec<u8> {
        let mut key = IDX_RECIPIENT.to_vec();
        key.extend_from_slice(recipient.as_str().as_bytes());
        key.push(b'|');
        key
    }

    fn index_key_recipient(recipient: &ClientId, notification_id: Uuid) -> Vec<u8> {
        let mut key = Self::index_prefix_recipient(recipient);
        key.extend_from_slice(notification_id.as_bytes());
        key
    }

    /// Scan an index namespace, returning the trailing UUIDs in key order
    fn scan_index_ids(&self, prefix: &[u8]) -> Result<Vec<Uuid>> {
        let cf = self.cf_handle(CF_INDICES)?;
        let iter = self.db.prefix_iterator_cf(&cf, prefix);

        let mut ids = Vec::new();
        for item in iter {
            let (key, _) = item?;

            // The iterator runs past the namespace once keys stop matching
            if !key.starts_with(prefix) {
                break;
            }

            if key.len() == prefix.len() + 16 {
                let tail: [u8; 16] = key[prefix.len()..]
                    .try_into()
                    .map_err(|_| Error::Storage("Malformed index key".to_string()))?;
                ids.push(Uuid::from_bytes(tail));
            }
        }

        Ok(ids)
    }

    // Statistics

    /// Get storage statistics
    pub fn get_stats(&self) -> Result<StorageStats> {
        let cf_tx = self.cf_handle(CF_TRANSACTIONS)?;
        let cf_notif = self.cf_handle(CF_NOTIFICATIONS)?;

        // Rates and wallets are small, count them exactly
        let rate_count = self.list_rates()?.len() as u64;
        let wallet_count = self.list_wallets()?.len() as u64;

        Ok(StorageStats {
            total_rates: rate_count,
            total_wallets: wallet_count,
            total_transactions: self.approximate_count(&cf_tx)?,
            total_notifications: self.approximate_count(&cf_notif)?,
        })
    }

    fn approximate_count(&self, cf: &Arc<BoundColumnFamily<'_>>) -> Result<u64> {
        // RocksDB property for approximate count
        let prop = self
            .db
            .property_int_value_cf(cf, "rocksdb.estimate-num-keys")?
            .unwrap_or(0);

        Ok(prop)
    }
}

/// Storage statistics
#[derive(Debug, Clone)]
pub struct StorageStats {
    /// Rate rows stored
    pub total_rates: u64,
    /// Wallet records stored
    pub total_wallets: u64,
    /// Transactions stored (approximate)
    pub total_transactions: u64,
    /// Notifications stored (approximate)
    pub total_notifications: u64,
}
