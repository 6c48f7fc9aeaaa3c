//! In-process link adapters
//!
//! Used when the identity gate and budget ledger live in the same
//! process as the transaction flow. The token has already crossed the
//! trust boundary, so the budget side ignores it.

use crate::boundary::{BudgetLink, IdentityLink, SpendOutcome};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tally_advisor::BudgetCheck;
use tally_budget::BudgetLedger;
use tally_core::Amount;
use tally_identity::{IdentityGate, TokenValidation};
use tracing::error;

/// [`IdentityLink`] over an in-process [`IdentityGate`].
pub struct LocalIdentityLink {
    gate: Arc<IdentityGate>,
}

impl LocalIdentityLink {
    pub fn new(gate: Arc<IdentityGate>) -> Self {
        Self { gate }
    }
}

#[async_trait]
impl IdentityLink for LocalIdentityLink {
    async fn validate(&self, token: &str) -> TokenValidation {
        self.gate.validate(token)
    }

    async fn validate_for_subject(&self, token: &str, expected_user_id: i64) -> TokenValidation {
        self.gate.validate_for_subject(token, expected_user_id)
    }
}

/// [`BudgetLink`] over an in-process [`BudgetLedger`].
pub struct LocalBudgetLink {
    ledger: Arc<BudgetLedger>,
}

impl LocalBudgetLink {
    pub fn new(ledger: Arc<BudgetLedger>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl BudgetLink for LocalBudgetLink {
    async fn check_spend(
        &self,
        _token: &str,
        user_id: i64,
        category: &str,
        amount: Decimal,
    ) -> BudgetCheck {
        match self.ledger.check_spend(user_id, category, amount).await {
            Ok(check) => check,
            Err(err) => {
                error!(user_id, category, %err, "budget pre-check failed");
                BudgetCheck::degraded(err.to_string())
            }
        }
    }

    async fn apply_spend(
        &self,
        _token: &str,
        user_id: i64,
        category: &str,
        amount: Decimal,
    ) -> SpendOutcome {
        let amount = match Amount::new(amount) {
            Ok(amount) => amount,
            Err(err) => return SpendOutcome::unavailable(err.to_string()),
        };
        match self.ledger.apply_spend(user_id, category, amount).await {
            Ok(Some(budget)) => SpendOutcome::applied(&budget),
            Ok(None) => SpendOutcome::no_budget(),
            Err(err) => {
                error!(user_id, category, %err, "budget spend-apply failed");
                SpendOutcome::unavailable(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tally_advisor::AlertLevel;
    use tally_budget::{BudgetLedger, LogNotifier, MemoryBudgetStore, NewBudget};
    use tally_core::BudgetPeriod;

    fn budget_link() -> LocalBudgetLink {
        let ledger = Arc::new(BudgetLedger::new(
            Arc::new(MemoryBudgetStore::new()),
            Arc::new(LogNotifier),
        ));
        LocalBudgetLink::new(ledger)
    }

    async fn seed(link: &LocalBudgetLink, limit: Decimal) {
        link.ledger
            .create(NewBudget {
                user_id: 1,
                category: "food".to_string(),
                limit,
                period: BudgetPeriod::Monthly,
                start_date: None,
                description: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_local_check_and_apply() {
        let link = budget_link();
        seed(&link, dec!(100)).await;

        let check = link.check_spend("ignored", 1, "food", dec!(30)).await;
        assert!(check.has_budget);
        assert!(!check.fallback);

        let outcome = link.apply_spend("ignored", 1, "food", dec!(30)).await;
        assert!(outcome.success);
        assert_eq!(outcome.new_spent, Some(dec!(30)));
    }

    #[tokio::test]
    async fn test_local_apply_without_budget() {
        let link = budget_link();
        let outcome = link.apply_spend("ignored", 1, "food", dec!(30)).await;
        assert!(!outcome.success);
        assert!(!outcome.fallback);
    }

    #[tokio::test]
    async fn test_local_identity_link() {
        let link = LocalIdentityLink::new(Arc::new(IdentityGate::new()));
        let token = tally_identity::mint_token(5, "eve", chrono::Duration::hours(1));
        let result = link.validate(&token).await;
        assert!(result.valid);
        assert_eq!(result.user_id, Some(5));

        let mismatch = link.validate_for_subject(&token, 6).await;
        assert!(!mismatch.valid);
    }

    #[tokio::test]
    async fn test_local_check_without_budget_is_not_degraded() {
        let link = budget_link();
        let check = link.check_spend("ignored", 1, "food", dec!(30)).await;
        assert!(!check.has_budget);
        assert!(!check.fallback);
        assert_ne!(check.alert_level, AlertLevel::Unknown);
    }
}
