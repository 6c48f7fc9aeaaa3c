// End-to-end tests for the transaction recording flow.
//
// The flow under test: AuthCheck → PreCheck → Persist → ApplySpend →
// Respond, with the degraded-mode semantics at each step.

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tally_advisor::{AlertLevel, BudgetCheck};
use tally_budget::{
    BudgetLedger, BudgetStatus, LogNotifier, MemoryBudgetStore, NewBudget, StoreError,
};
use tally_core::{Amount, BudgetPeriod};
use tally_identity::{IdentityGate, TokenValidation};
use tally_link::{BudgetLink, IdentityLink, LocalBudgetLink, LocalIdentityLink, SpendOutcome};
use tally_transaction::{
    MemoryTransactionStore, Transaction, TransactionCoordinator, TransactionError,
    TransactionRecord, TransactionRequest, TransactionStore,
};

// ── Test doubles ────────────────────────────────────────────────────

/// Identity link with a fixed verdict.
struct StubIdentity {
    valid: bool,
}

#[async_trait]
impl IdentityLink for StubIdentity {
    async fn validate(&self, _token: &str) -> TokenValidation {
        if self.valid {
            TokenValidation::ok(1, "alice")
        } else {
            TokenValidation::invalid("Invalid or expired token")
        }
    }

    async fn validate_for_subject(&self, token: &str, _expected: i64) -> TokenValidation {
        self.validate(token).await
    }
}

/// Budget link standing in for an unreachable budget service.
struct UnreachableBudget {
    apply_calls: AtomicUsize,
}

impl UnreachableBudget {
    fn new() -> Self {
        Self {
            apply_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl BudgetLink for UnreachableBudget {
    async fn check_spend(
        &self,
        _token: &str,
        _user_id: i64,
        _category: &str,
        _amount: Decimal,
    ) -> BudgetCheck {
        BudgetCheck::degraded("connection refused")
    }

    async fn apply_spend(
        &self,
        _token: &str,
        _user_id: i64,
        _category: &str,
        _amount: Decimal,
    ) -> SpendOutcome {
        self.apply_calls.fetch_add(1, Ordering::SeqCst);
        SpendOutcome::unavailable("connection refused")
    }
}

/// Budget link that checks fine but fails the post-commit apply.
struct ApplyFailsBudget;

#[async_trait]
impl BudgetLink for ApplyFailsBudget {
    async fn check_spend(
        &self,
        _token: &str,
        _user_id: i64,
        _category: &str,
        amount: Decimal,
    ) -> BudgetCheck {
        BudgetCheck::evaluate(1, dec!(100), dec!(0), amount)
    }

    async fn apply_spend(
        &self,
        _token: &str,
        _user_id: i64,
        _category: &str,
        _amount: Decimal,
    ) -> SpendOutcome {
        SpendOutcome::unavailable("socket hang up")
    }
}

/// Counts `save` calls so tests can assert nothing was persisted.
struct CountingStore {
    inner: MemoryTransactionStore,
    saves: AtomicUsize,
}

impl CountingStore {
    fn new() -> Self {
        Self {
            inner: MemoryTransactionStore::new(),
            saves: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TransactionStore for CountingStore {
    async fn save(&self, record: TransactionRecord) -> Result<Transaction, StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save(record).await
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Transaction>, StoreError> {
        self.inner.find_by_user(user_id).await
    }

    async fn find_by_user_and_category(
        &self,
        user_id: i64,
        category: &str,
    ) -> Result<Vec<Transaction>, StoreError> {
        self.inner.find_by_user_and_category(user_id, category).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Transaction>, StoreError> {
        self.inner.find_by_id(id).await
    }
}

fn request(amount: Decimal, category: &str) -> TransactionRequest {
    TransactionRequest {
        user_id: 1,
        amount,
        category: category.to_string(),
        description: None,
    }
}

// ── AuthCheck ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_invalid_credential_persists_nothing() {
    let store = Arc::new(CountingStore::new());
    let coordinator = TransactionCoordinator::new(
        Arc::new(StubIdentity { valid: false }),
        Arc::new(UnreachableBudget::new()),
        Arc::clone(&store) as Arc<dyn TransactionStore>,
    );

    let result = coordinator.record(request(dec!(10), "food"), "bad-token").await;

    assert!(matches!(result, Err(TransactionError::Unauthorized(_))));
    assert_eq!(store.saves.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_invalid_request_persists_nothing_and_skips_auth() {
    let store = Arc::new(CountingStore::new());
    let coordinator = TransactionCoordinator::new(
        Arc::new(StubIdentity { valid: true }),
        Arc::new(UnreachableBudget::new()),
        Arc::clone(&store) as Arc<dyn TransactionStore>,
    );

    let result = coordinator.record(request(dec!(-10), "food"), "token").await;

    assert!(matches!(result, Err(TransactionError::Validation(_))));
    assert_eq!(store.saves.load(Ordering::SeqCst), 0);
}

// ── PreCheck fallback ───────────────────────────────────────────────

#[tokio::test]
async fn test_budget_outage_still_records_transaction() {
    let budget = Arc::new(UnreachableBudget::new());
    let store = Arc::new(CountingStore::new());
    let coordinator = TransactionCoordinator::new(
        Arc::new(StubIdentity { valid: true }),
        Arc::clone(&budget) as Arc<dyn BudgetLink>,
        Arc::clone(&store) as Arc<dyn TransactionStore>,
    );

    let receipt = coordinator
        .record(request(dec!(10), "food"), "token")
        .await
        .unwrap();

    assert_eq!(store.saves.load(Ordering::SeqCst), 1);
    assert!(receipt.budget_info.is_fallback);
    assert!(!receipt.budget_info.has_budget);
    assert_eq!(
        receipt.budget_info.budget_check.alert_level,
        AlertLevel::Unknown
    );
    assert!(receipt.message.contains("budget service unavailable"));
    // A fallback pre-check means the apply step is skipped entirely.
    assert_eq!(budget.apply_calls.load(Ordering::SeqCst), 0);
}

// ── ApplySpend failure after commit ─────────────────────────────────

#[tokio::test]
async fn test_apply_failure_does_not_fail_committed_transaction() {
    let store = Arc::new(CountingStore::new());
    let coordinator = TransactionCoordinator::new(
        Arc::new(StubIdentity { valid: true }),
        Arc::new(ApplyFailsBudget),
        Arc::clone(&store) as Arc<dyn TransactionStore>,
    );

    let receipt = coordinator
        .record(request(dec!(10), "food"), "token")
        .await
        .unwrap();

    assert_eq!(store.saves.load(Ordering::SeqCst), 1);
    assert!(receipt.budget_info.has_budget);
    assert!(!receipt.budget_info.is_fallback);
    assert_eq!(receipt.message, "Transaction created successfully");
}

// ── Full local flow ─────────────────────────────────────────────────

struct LocalRig {
    coordinator: TransactionCoordinator,
    ledger: Arc<BudgetLedger>,
    token: String,
}

async fn local_rig() -> LocalRig {
    let ledger = Arc::new(BudgetLedger::new(
        Arc::new(MemoryBudgetStore::new()),
        Arc::new(LogNotifier),
    ));
    let gate = Arc::new(IdentityGate::new());
    let coordinator = TransactionCoordinator::new(
        Arc::new(LocalIdentityLink::new(gate)),
        Arc::new(LocalBudgetLink::new(Arc::clone(&ledger))),
        Arc::new(MemoryTransactionStore::new()),
    );
    let token = tally_identity::mint_token(1, "alice", chrono::Duration::hours(1));
    LocalRig {
        coordinator,
        ledger,
        token,
    }
}

#[tokio::test]
async fn test_overspend_reports_critical_and_exceeds_budget() {
    let rig = local_rig().await;
    rig.ledger
        .create(NewBudget {
            user_id: 1,
            category: "food".to_string(),
            limit: dec!(100),
            period: BudgetPeriod::Monthly,
            start_date: None,
            description: None,
        })
        .await
        .unwrap();
    rig.ledger
        .apply_spend(1, "food", Amount::new(dec!(90)).unwrap())
        .await
        .unwrap();

    let receipt = rig
        .coordinator
        .record(request(dec!(15), "food"), &rig.token)
        .await
        .unwrap();

    let check = &receipt.budget_info.budget_check;
    assert!(check.will_exceed);
    assert_eq!(check.exceed_amount, dec!(5));
    assert_eq!(check.remaining_after, Some(dec!(-5)));
    assert_eq!(check.alert_level, AlertLevel::Critical);
    assert!(receipt.budget_info.will_exceed_budget);

    let today = chrono::Utc::now().date_naive();
    let budget = rig
        .ledger
        .find_current(1, "food", today)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(budget.spent.value(), dec!(105));
    assert_eq!(budget.status, BudgetStatus::Exceeded);
}

#[tokio::test]
async fn test_no_budget_category_records_without_apply() {
    let rig = local_rig().await;

    let receipt = rig
        .coordinator
        .record(request(dec!(15), "travel"), &rig.token)
        .await
        .unwrap();

    assert!(!receipt.budget_info.has_budget);
    assert!(!receipt.budget_info.is_fallback);
    assert!(receipt.budget_info.budget_message.contains("travel"));
}

#[tokio::test]
async fn test_receipt_wire_shape() {
    let rig = local_rig().await;
    let receipt = rig
        .coordinator
        .record(request(dec!(15), "travel"), &rig.token)
        .await
        .unwrap();

    let json = serde_json::to_value(&receipt).unwrap();
    // Transaction fields are flattened into the receipt.
    assert_eq!(json["userId"], 1);
    assert_eq!(json["category"], "travel");
    assert_eq!(json["status"], "COMPLETED");
    assert_eq!(json["budgetInfo"]["isFallback"], false);
    assert_eq!(json["budgetInfo"]["hasBudget"], false);
}

// ── Reads and balance ───────────────────────────────────────────────

#[tokio::test]
async fn test_reads_require_valid_token() {
    let rig = local_rig().await;
    let result = rig.coordinator.transactions_for_user(1, "garbage").await;
    assert!(matches!(result, Err(TransactionError::Unauthorized(_))));
}

#[tokio::test]
async fn test_balance_credits_income_and_debits_spending() {
    let rig = local_rig().await;
    rig.coordinator
        .record(request(dec!(500), "INCOME"), &rig.token)
        .await
        .unwrap();
    rig.coordinator
        .record(request(dec!(120), "food"), &rig.token)
        .await
        .unwrap();

    let balance = rig.coordinator.balance_for_user(1, &rig.token).await.unwrap();
    assert_eq!(balance, dec!(380));

    let summary = rig
        .coordinator
        .category_summary(1, &rig.token)
        .await
        .unwrap();
    assert_eq!(summary["INCOME"], dec!(500));
    assert_eq!(summary["food"], dec!(120));
}

#[tokio::test]
async fn test_transaction_by_id_not_found() {
    let rig = local_rig().await;
    let result = rig.coordinator.transaction_by_id(999, &rig.token).await;
    assert!(matches!(result, Err(TransactionError::NotFound(999))));
}
