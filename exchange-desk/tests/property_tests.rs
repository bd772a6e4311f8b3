//! Property-based tests for desk invariants
//!
//! These tests use proptest to verify critical invariants:
//! - Fail-closed pricing: no rate row for today means no quote
//! - Snapshot consistency: a submitted transaction carries exactly the
//!   legs its quote promised
//! - Authorization: only active administrators decide or reconfigure
//! - Best-effort dispatch: delivery failures never lose the stored inbox

use desk_core::types::{ClientId, EventKind, NotificationRecord, TransactionStatus, WalletKind};
use exchange_desk::{Config, Error, ExchangeDesk, Notifier};
use parking_lot::Mutex;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;

const ADMIN: &str = "admin-ops";

/// Notifier that records deliveries for assertions
#[derive(Default)]
struct RecordingNotifier {
    delivered: Mutex<Vec<NotificationRecord>>,
}

impl RecordingNotifier {
    fn delivered(&self) -> Vec<NotificationRecord> {
        self.delivered.lock().clone()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, notification: &NotificationRecord) -> exchange_desk::Result<()> {
        self.delivered.lock().push(notification.clone());
        Ok(())
    }
}

/// Notifier whose channel is permanently down
struct FailingNotifier;

#[async_trait::async_trait]
impl Notifier for FailingNotifier {
    async fn deliver(&self, _notification: &NotificationRecord) -> exchange_desk::Result<()> {
        Err(Error::Notify("channel down".to_string()))
    }
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}

/// Create test desk with temp directory and a recording notifier
async fn create_test_desk() -> (ExchangeDesk, Arc<RecordingNotifier>) {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.core_data_dir = temp_dir.path().to_path_buf();
    config.directory.admins = vec![ADMIN.to_string()];

    let notifier = Arc::new(RecordingNotifier::default());
    let desk = ExchangeDesk::new(config)
        .await
        .unwrap()
        .with_notifier(notifier.clone());

    (desk, notifier)
}

/// Set today's rate and register both settlement destinations
async fn fund_desk(desk: &ExchangeDesk) {
    let admin = ClientId::new(ADMIN);
    desk.set_rate(&admin, today(), Decimal::from(595), Decimal::from(610))
        .await
        .unwrap();
    desk.add_wallet(
        &admin,
        WalletKind::MobileMoney,
        "MTN",
        "677000111",
        Some("CM".to_string()),
    )
    .await
    .unwrap();
    desk.add_wallet(&admin, WalletKind::Crypto, "TRC20", "TDeskWallet1", None)
        .await
        .unwrap();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: No rate for today means no quote, whatever the amount
    #[test]
    fn prop_quotes_fail_closed_without_rate(amount in 5_000u64..500_000u64) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (desk, _) = create_test_desk().await;

            let result = desk.quote_buy(Decimal::from(amount));
            prop_assert!(matches!(
                result,
                Err(Error::Core(desk_core::Error::RateUndefined(_)))
            ));

            desk.shutdown().await.unwrap();
            Ok(())
        })?;
    }

    /// Property: A submitted buy carries exactly the legs its quote
    /// promised
    #[test]
    fn prop_submission_snapshots_quote(amount in 5_000u64..500_000u64) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (desk, _) = create_test_desk().await;
            fund_desk(&desk).await;

            let quote = desk.quote_buy(Decimal::from(amount)).unwrap();
            let tx = desk
                .submit_buy(
                    ClientId::new("client-prop"),
                    Decimal::from(amount),
                    "TRC20",
                    Some("MTN"),
                    Some("CM"),
                    "TClientAddr1",
                )
                .await
                .unwrap();

            prop_assert_eq!(tx.amount_xaf, quote.amount_xaf);
            prop_assert_eq!(tx.amount_usdt, quote.usdt_out);
            prop_assert_eq!(tx.applied_rate, quote.effective_rate);
            prop_assert_eq!(tx.settlement_destination.as_str(), "677000111");
            prop_assert_eq!(tx.status, TransactionStatus::Pending);

            desk.shutdown().await.unwrap();
            Ok(())
        })?;
    }

    /// Property: Whoever is not in the directory cannot decide, and the
    /// transaction stays pending
    #[test]
    fn prop_outsiders_never_decide(actor in "[a-z]{6}") {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (desk, _) = create_test_desk().await;
            fund_desk(&desk).await;

            let tx = desk
                .submit_sell(
                    ClientId::new("client-prop"),
                    Decimal::from(50),
                    "TRC20",
                    "677000222",
                )
                .await
                .unwrap();

            let outsider = ClientId::new(actor);
            let approve = desk.approve(&outsider, tx.id).await;
            prop_assert!(matches!(approve, Err(Error::Unauthorized(_))));

            let reject = desk.reject(&outsider, tx.id, None).await;
            prop_assert!(matches!(reject, Err(Error::Unauthorized(_))));

            let stored = desk.transaction(tx.id).unwrap();
            prop_assert_eq!(stored.status, TransactionStatus::Pending);

            desk.shutdown().await.unwrap();
            Ok(())
        })?;
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[tokio::test]
    async fn test_buy_lifecycle_end_to_end() {
        let (desk, notifier) = create_test_desk().await;
        fund_desk(&desk).await;

        let owner = ClientId::new("client-buy");
        let admin = ClientId::new(ADMIN);

        // 100 000 XAF falls in the 1.51% band against the 610 sell rate
        let quote = desk.quote_buy(Decimal::from(100_000)).unwrap();
        assert_eq!(quote.fee_xaf, dec("1510.00"));
        assert_eq!(quote.fee_per_usdt, dec("2.48"));
        assert_eq!(quote.effective_rate, dec("612.48"));
        assert_eq!(quote.usdt_before_fees, dec("163.93"));
        assert_eq!(quote.usdt_out, dec("163.27"));

        let tx = desk
            .submit_buy(
                owner.clone(),
                Decimal::from(100_000),
                "TRC20",
                Some("MTN"),
                Some("CM"),
                "TClientAddr1",
            )
            .await
            .unwrap();

        assert_eq!(tx.amount_usdt, dec("163.27"));
        assert_eq!(tx.applied_rate, dec("612.48"));
        assert_eq!(tx.settlement_destination, "677000111");
        assert_eq!(tx.mobile_operator.as_deref(), Some("MTN"));

        // The admin audience heard about it immediately
        let announced = notifier.delivered();
        assert_eq!(announced.len(), 1);
        assert_eq!(announced[0].recipient, admin);
        assert_eq!(announced[0].kind, EventKind::NewTransaction);
        assert_eq!(announced[0].message, "Nouvel achat : 100000 XAF");

        let approved = desk.approve(&admin, tx.id).await.unwrap();
        assert_eq!(approved.status, TransactionStatus::Completed);
        assert!(approved.decided_at.is_some());

        // The owner heard about the decision
        let delivered = notifier.delivered();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[1].recipient, owner);
        assert_eq!(delivered[1].message, "Transaction validée: 163.27 USDT");

        let owner_inbox = desk.notifications_for(&owner).unwrap();
        assert_eq!(owner_inbox.len(), 1);
        assert_eq!(owner_inbox[0].kind, EventKind::TransactionApproved);

        desk.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_sell_lifecycle_with_rejection() {
        let (desk, notifier) = create_test_desk().await;
        fund_desk(&desk).await;

        let owner = ClientId::new("client-sell");
        let admin = ClientId::new(ADMIN);

        // 50 USDT falls in the 1.51% band against the 595 buy rate; the
        // raw 0.755 fee rounds half-up before the per-unit step
        let quote = desk.quote_sell(Decimal::from(50)).unwrap();
        assert_eq!(quote.fee_usdt, dec("0.76"));
        assert_eq!(quote.effective_rate, dec("595.00"));
        assert_eq!(quote.xaf_out, dec("29749.94"));

        let tx = desk
            .submit_sell(owner.clone(), Decimal::from(50), "TRC20", "677000222")
            .await
            .unwrap();

        assert_eq!(tx.amount_xaf, dec("29749.94"));
        assert_eq!(tx.settlement_destination, "TDeskWallet1");
        assert_eq!(tx.counterparty_wallet, "677000222");
        assert_eq!(notifier.delivered()[0].message, "Nouvelle vente : 50 USDT");

        let rejected = desk
            .reject(&admin, tx.id, Some("Paiement non reçu".to_string()))
            .await
            .unwrap();

        assert_eq!(rejected.status, TransactionStatus::Rejected);
        assert_eq!(rejected.rejection_reason.as_deref(), Some("Paiement non reçu"));

        let delivered = notifier.delivered();
        assert_eq!(delivered[1].recipient, owner);
        assert_eq!(
            delivered[1].message,
            "Transaction rejetée. Motif: Paiement non reçu"
        );

        desk.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_unfunded_network_has_no_destination() {
        let (desk, _) = create_test_desk().await;
        fund_desk(&desk).await;

        let owner = ClientId::new("client-erc");
        let result = desk
            .submit_sell(owner.clone(), Decimal::from(50), "ERC20", "677000222")
            .await;

        assert!(matches!(
            result,
            Err(Error::Core(desk_core::Error::NoDestinationAvailable(_)))
        ));

        // Allocation happens before anything is committed
        assert!(desk.transactions_for(&owner).unwrap().is_empty());

        desk.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_out_of_band_amounts_refused() {
        let (desk, _) = create_test_desk().await;
        fund_desk(&desk).await;

        let owner = ClientId::new("client-band");

        let below = desk
            .submit_buy(
                owner.clone(),
                Decimal::from(4_999),
                "TRC20",
                Some("MTN"),
                Some("CM"),
                "TClientAddr1",
            )
            .await;
        assert!(matches!(
            below,
            Err(Error::Pricing(pricing_engine::Error::BelowMinimum { .. }))
        ));

        let above = desk
            .submit_buy(
                owner.clone(),
                Decimal::from(500_000),
                "TRC20",
                Some("MTN"),
                Some("CM"),
                "TClientAddr1",
            )
            .await;
        assert!(matches!(
            above,
            Err(Error::Pricing(pricing_engine::Error::AboveMaximum { .. }))
        ));

        assert!(desk.transactions_for(&owner).unwrap().is_empty());

        desk.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_delivery_failure_keeps_inbox() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.core_data_dir = temp_dir.path().to_path_buf();
        config.directory.admins = vec![ADMIN.to_string()];

        let desk = ExchangeDesk::new(config)
            .await
            .unwrap()
            .with_notifier(Arc::new(FailingNotifier));
        fund_desk(&desk).await;

        // Submission succeeds even though every delivery fails
        let tx = desk
            .submit_buy(
                ClientId::new("client-down"),
                Decimal::from(100_000),
                "TRC20",
                Some("MTN"),
                Some("CM"),
                "TClientAddr1",
            )
            .await
            .unwrap();
        assert_eq!(tx.status, TransactionStatus::Pending);

        // The stored inbox has the announcement regardless
        let admin_inbox = desk.notifications_for(&ClientId::new(ADMIN)).unwrap();
        assert_eq!(admin_inbox.len(), 1);
        assert!(!admin_inbox[0].read);

        desk.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_rate_replacement_moves_new_quotes_only() {
        let (desk, _) = create_test_desk().await;
        fund_desk(&desk).await;

        let admin = ClientId::new(ADMIN);
        let owner = ClientId::new("client-rate");

        let tx = desk
            .submit_buy(
                owner.clone(),
                Decimal::from(100_000),
                "TRC20",
                Some("MTN"),
                Some("CM"),
                "TClientAddr1",
            )
            .await
            .unwrap();
        assert_eq!(tx.applied_rate, dec("612.48"));

        desk.set_rate(&admin, today(), Decimal::from(600), Decimal::from(620))
            .await
            .unwrap();

        // New quotes see the replaced rate
        let quote = desk.quote_buy(Decimal::from(100_000)).unwrap();
        assert_eq!(quote.effective_rate, dec("622.44"));
        assert_eq!(quote.usdt_out, dec("160.66"));

        // The open transaction keeps its snapshot
        let stored = desk.transaction(tx.id).unwrap();
        assert_eq!(stored.applied_rate, dec("612.48"));
        assert_eq!(stored.amount_usdt, dec("163.27"));

        desk.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_review_queue_tracks_decisions() {
        let (desk, _) = create_test_desk().await;
        fund_desk(&desk).await;

        let admin = ClientId::new(ADMIN);

        let first = desk
            .submit_buy(
                ClientId::new("client-q1"),
                Decimal::from(50_000),
                "TRC20",
                Some("MTN"),
                Some("CM"),
                "TClientAddr1",
            )
            .await
            .unwrap();
        desk.submit_sell(ClientId::new("client-q2"), Decimal::from(50), "TRC20", "677000222")
            .await
            .unwrap();

        assert_eq!(desk.pending_transactions(&admin).await.unwrap().len(), 2);

        desk.approve(&admin, first.id).await.unwrap();
        let queue = desk.pending_transactions(&admin).await.unwrap();
        assert_eq!(queue.len(), 1);

        // The queue itself is an administrator surface
        let outsider = ClientId::new("client-q1");
        assert!(matches!(
            desk.pending_transactions(&outsider).await,
            Err(Error::Unauthorized(_))
        ));

        desk.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_retired_wallet_never_allocated() {
        let (desk, _) = create_test_desk().await;
        fund_desk(&desk).await;

        let admin = ClientId::new(ADMIN);
        let wallets = desk.list_wallets(&admin).await.unwrap();
        let crypto = wallets
            .iter()
            .find(|w| w.kind == WalletKind::Crypto)
            .unwrap();

        desk.set_wallet_active(&admin, crypto.id, false)
            .await
            .unwrap();

        let result = desk
            .submit_sell(ClientId::new("client-ret"), Decimal::from(50), "TRC20", "677000222")
            .await;
        assert!(matches!(
            result,
            Err(Error::Core(desk_core::Error::NoDestinationAvailable(_)))
        ));

        desk.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_mark_notification_read_via_desk() {
        let (desk, _) = create_test_desk().await;
        fund_desk(&desk).await;

        let admin = ClientId::new(ADMIN);
        desk.submit_buy(
            ClientId::new("client-read"),
            Decimal::from(100_000),
            "TRC20",
            Some("MTN"),
            Some("CM"),
            "TClientAddr1",
        )
        .await
        .unwrap();

        let inbox = desk.notifications_for(&admin).unwrap();
        assert!(!inbox[0].read);

        let marked = desk.mark_notification_read(inbox[0].id).unwrap();
        assert!(marked.read);
        assert!(desk.notifications_for(&admin).unwrap()[0].read);

        desk.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_metrics_track_the_flow() {
        let (desk, _) = create_test_desk().await;
        fund_desk(&desk).await;

        let admin = ClientId::new(ADMIN);
        let metrics = desk.metrics();
        assert_eq!(metrics.rate_updates.get(), 1);

        let tx = desk
            .submit_buy(
                ClientId::new("client-m"),
                Decimal::from(100_000),
                "TRC20",
                Some("MTN"),
                Some("CM"),
                "TClientAddr1",
            )
            .await
            .unwrap();
        desk.approve(&admin, tx.id).await.unwrap();

        assert_eq!(metrics.transactions_created.get(), 1);
        assert_eq!(metrics.transactions_approved.get(), 1);
        assert_eq!(metrics.notifications_recorded.get(), 2);

        desk.shutdown().await.unwrap();
    }
}
