//! Link traits and the spend-apply outcome type

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_advisor::BudgetCheck;
use tally_budget::{Budget, BudgetStatus};
use tally_identity::TokenValidation;

/// Result of asking the budget dependency to record a committed spend.
///
/// `success == false` with `fallback == true` means the dependency was
/// unreachable; with `fallback == false` it means no current budget
/// covered the category. Either way the transaction stands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendOutcome {
    pub success: bool,
    #[serde(default)]
    pub fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_spent: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BudgetStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SpendOutcome {
    /// The spend landed on a budget.
    pub fn applied(budget: &Budget) -> Self {
        Self {
            success: true,
            fallback: false,
            budget_id: Some(budget.id),
            new_spent: Some(budget.spent.value()),
            remaining: Some(budget.remaining()),
            status: Some(budget.status),
            message: None,
        }
    }

    /// No current budget covered the category.
    pub fn no_budget() -> Self {
        Self {
            success: false,
            fallback: false,
            budget_id: None,
            new_spent: None,
            remaining: None,
            status: None,
            message: Some("No active budget found for this category".to_string()),
        }
    }

    /// The budget dependency could not be reached.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            fallback: true,
            budget_id: None,
            new_spent: None,
            remaining: None,
            status: None,
            message: Some(reason.into()),
        }
    }
}

/// Access to the identity dependency.
///
/// A transport fault during remote validation yields `valid == false`
/// (the request is refused, not admitted unchecked).
#[async_trait]
pub trait IdentityLink: Send + Sync {
    async fn validate(&self, token: &str) -> TokenValidation;

    async fn validate_for_subject(&self, token: &str, expected_user_id: i64) -> TokenValidation;
}

/// Access to the budget dependency.
///
/// `token` is the original caller's bearer credential, forwarded
/// unchanged when the dependency is remote.
#[async_trait]
pub trait BudgetLink: Send + Sync {
    /// Pre-commit check: classify the proposed spend. Transport faults
    /// become a degraded [`BudgetCheck`] (`fallback == true`).
    async fn check_spend(
        &self,
        token: &str,
        user_id: i64,
        category: &str,
        amount: Decimal,
    ) -> BudgetCheck;

    /// Post-commit apply: record the spend. Transport faults become an
    /// unavailable [`SpendOutcome`].
    async fn apply_spend(
        &self,
        token: &str,
        user_id: i64,
        category: &str,
        amount: Decimal,
    ) -> SpendOutcome;
}
