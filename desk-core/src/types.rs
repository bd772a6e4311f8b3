//! Core types for the exchange desk
//!
//! All types are designed for:
//! - Deterministic serialization (bincode)
//! - Exact arithmetic (Decimal for money)
//! - Snapshot semantics (transactions never re-read mutable rows)

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Client identifier (opaque account reference from the caller's side)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(String);

impl ClientId {
    /// Create new client ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of an exchange, seen from the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// Client pays XAF and receives USDT
    Buy = 1,
    /// Client surrenders USDT and receives XAF
    Sell = 2,
}

impl Direction {
    /// Lowercase tag used in logs and indices
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Buy => "buy",
            Direction::Sell => "sell",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum TransactionStatus {
    /// Awaiting an administrator decision
    Pending = 1,
    /// Settled (terminal)
    Completed = 2,
    /// Refused (terminal)
    Rejected = 3,
}

impl TransactionStatus {
    /// Whether the status admits no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Completed | TransactionStatus::Rejected)
    }

    /// Lowercase tag used in logs and indices
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Daily exchange rate row, one per calendar date
///
/// `buy_rate` is what the desk pays per USDT, `sell_rate` what it
/// charges. Replacing a day's row never touches transactions that
/// already captured a snapshot of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Calendar date this rate is valid for (unique key)
    pub effective_date: NaiveDate,

    /// XAF per USDT offered to a selling client
    pub buy_rate: Decimal,

    /// XAF per USDT charged to a buying client
    pub sell_rate: Decimal,

    /// Last write time for this row
    pub recorded_at: DateTime<Utc>,
}

/// Kind of settlement destination the desk operates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum WalletKind {
    /// USDT wallet on a crypto network
    Crypto = 1,
    /// Mobile-money merchant number
    MobileMoney = 2,
}

impl WalletKind {
    /// Lowercase tag used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletKind::Crypto => "crypto",
            WalletKind::MobileMoney => "mobile_money",
        }
    }
}

/// Administrative settlement destination
///
/// Wallets are never deleted; deactivation retires them while keeping
/// historical transactions resolvable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletRecord {
    /// Unique ID (UUIDv7, so key order is insertion order)
    pub id: Uuid,

    /// Crypto or mobile money
    pub kind: WalletKind,

    /// Crypto network ("TRC20") or mobile operator ("MTN")
    pub network: String,

    /// Address or merchant number clients settle against
    pub destination: String,

    /// Country the destination serves, when operator-specific
    pub country: Option<String>,

    /// Eligible for allocation
    pub active: bool,

    /// Registration time
    pub added_at: DateTime<Utc>,
}

impl WalletRecord {
    /// Register a new active wallet
    pub fn new(
        kind: WalletKind,
        network: impl Into<String>,
        destination: impl Into<String>,
        country: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            kind,
            network: network.into(),
            destination: destination.into(),
            country,
            active: true,
            added_at: Utc::now(),
        }
    }
}

/// Request payload for opening a transaction
///
/// Amounts and the applied rate come from a quote computed against the
/// day's rate; the settlement destination from the wallet allocator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    /// Requesting client
    pub owner: ClientId,

    /// Buy or sell, client perspective
    pub direction: Direction,

    /// XAF leg of the exchange
    pub amount_xaf: Decimal,

    /// USDT leg of the exchange
    pub amount_usdt: Decimal,

    /// Effective XAF-per-USDT rate the client was quoted
    pub applied_rate: Decimal,

    /// Crypto network of the USDT leg
    pub network: String,

    /// Mobile operator, recorded on buy requests
    pub mobile_operator: Option<String>,

    /// Client-supplied wallet: USDT address on buys, payout number on sells
    pub counterparty_wallet: String,

    /// Allocated admin destination the client settles against
    pub settlement_destination: String,
}

/// Exchange transaction driven from `Pending` to a terminal state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeTransaction {
    /// Unique ID (UUIDv7 for time-ordering)
    pub id: Uuid,

    /// Requesting client
    pub owner: ClientId,

    /// Buy or sell, client perspective
    pub direction: Direction,

    /// XAF leg of the exchange
    pub amount_xaf: Decimal,

    /// USDT leg of the exchange
    pub amount_usdt: Decimal,

    /// Rate snapshot taken at creation (immutable)
    pub applied_rate: Decimal,

    /// Crypto network of the USDT leg
    pub network: String,

    /// Mobile operator, recorded on buy requests
    pub mobile_operator: Option<String>,

    /// Client-supplied wallet or payout number
    pub counterparty_wallet: String,

    /// Destination snapshot taken at creation (immutable)
    pub settlement_destination: String,

    /// Current status
    pub status: TransactionStatus,

    /// Reason recorded on rejection, possibly empty
    pub rejection_reason: Option<String>,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Decision time, set exactly once
    pub decided_at: Option<DateTime<Utc>>,
}

impl ExchangeTransaction {
    /// Open a new pending transaction from a request
    pub fn create(new: NewTransaction) -> Self {
        Self {
            id: Uuid::now_v7(),
            owner: new.owner,
            direction: new.direction,
            amount_xaf: new.amount_xaf,
            amount_usdt: new.amount_usdt,
            applied_rate: new.applied_rate,
            network: new.network,
            mobile_operator: new.mobile_operator,
            counterparty_wallet: new.counterparty_wallet,
            settlement_destination: new.settlement_destination,
            status: TransactionStatus::Pending,
            rejection_reason: None,
            created_at: Utc::now(),
            decided_at: None,
        }
    }

    /// Apply a terminal decision
    ///
    /// Fails with `InvalidTransition` when the transaction is no longer
    /// pending; the record is left untouched in that case.
    pub fn apply_decision(&mut self, decision: &Decision) -> crate::Result<()> {
        if self.status != TransactionStatus::Pending {
            return Err(crate::Error::InvalidTransition {
                id: self.id,
                status: self.status,
            });
        }

        match decision {
            Decision::Approve => {
                self.status = TransactionStatus::Completed;
            }
            Decision::Reject { reason } => {
                self.status = TransactionStatus::Rejected;
                self.rejection_reason = reason.clone();
            }
        }

        self.decided_at = Some(Utc::now());
        Ok(())
    }

    /// Whether the transaction is in a terminal state
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Announcement text sent to the admin audience at creation
    pub fn creation_message(&self) -> String {
        match self.direction {
            Direction::Buy => format!("Nouvel achat : {} XAF", self.amount_xaf),
            Direction::Sell => format!("Nouvelle vente : {} USDT", self.amount_usdt),
        }
    }
}

/// Terminal decision on a pending transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Decision {
    /// Settle the transaction
    Approve,
    /// Refuse the transaction
    Reject {
        /// Free-form reason, stored as provided (empty allowed)
        reason: Option<String>,
    },
}

impl Decision {
    /// Notification kind this decision produces
    pub fn event_kind(&self) -> EventKind {
        match self {
            Decision::Approve => EventKind::TransactionApproved,
            Decision::Reject { .. } => EventKind::TransactionRejected,
        }
    }

    /// Text sent to the transaction owner once the decision commits
    pub fn client_message(&self, tx: &ExchangeTransaction) -> String {
        match self {
            Decision::Approve => format!("Transaction validée: {} USDT", tx.amount_usdt),
            Decision::Reject { reason } => format!(
                "Transaction rejetée. Motif: {}",
                reason.as_deref().unwrap_or("")
            ),
        }
    }
}

/// Lifecycle notification kind
///
/// The wire names are what downstream consumers key on and must not
/// change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventKind {
    /// A transaction entered the book
    NewTransaction = 1,
    /// A pending transaction was settled
    TransactionApproved = 2,
    /// A pending transaction was refused
    TransactionRejected = 3,
}

impl EventKind {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::NewTransaction => "nouvelle_transaction",
            EventKind::TransactionApproved => "transaction_validee",
            EventKind::TransactionRejected => "transaction_rejetee",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Persisted lifecycle notification
///
/// Recorded in the same write batch as the transaction change it
/// describes, then dispatched best-effort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// Unique ID (UUIDv7 for time-ordering)
    pub id: Uuid,

    /// Client this notification addresses
    pub recipient: ClientId,

    /// Lifecycle kind
    pub kind: EventKind,

    /// Human-readable text
    pub message: String,

    /// Transaction the notification refers to
    pub transaction_id: Uuid,

    /// Read flag, false until the recipient marks it
    pub read: bool,

    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl NotificationRecord {
    /// Create an unread notification
    pub fn new(
        recipient: ClientId,
        kind: EventKind,
        message: impl Into<String>,
        transaction_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            recipient,
            kind,
            message: message.into(),
            transaction_id,
            read: false,
            created_at: Utc::now(),
        }
    }
}
