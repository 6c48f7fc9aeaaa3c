//! Budget check - the advisor's verdict on a proposed spend

use crate::alert::AlertLevel;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Verdict on a proposed spend against a budget.
///
/// Produced before a transaction commits (hypothetical) and conceptually
/// again after the spend is applied. `fallback == true` marks a degraded
/// result synthesized because the budget could not be consulted - callers
/// can tell "no budget" apart from "couldn't check".
///
/// The serialized form is the `/api/budgets/check-transaction` wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetCheck {
    pub has_budget: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_id: Option<i64>,
    #[serde(
        rename = "budgetAmount",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub limit: Option<Decimal>,
    #[serde(
        rename = "currentSpent",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub spent_before: Option<Decimal>,
    #[serde(
        rename = "currentRemaining",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub remaining_before: Option<Decimal>,
    #[serde(
        rename = "remainingAfterTransaction",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub remaining_after: Option<Decimal>,
    #[serde(default)]
    pub will_exceed: bool,
    #[serde(default)]
    pub exceed_amount: Decimal,
    pub alert_level: AlertLevel,
    #[serde(default)]
    pub fallback: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BudgetCheck {
    /// Classify a proposed spend of `amount` against a budget with the
    /// given limit and spending so far. Pure.
    pub fn evaluate(
        budget_id: i64,
        limit: Decimal,
        spent_before: Decimal,
        amount: Decimal,
    ) -> Self {
        let spent_after = spent_before + amount;
        let remaining_before = limit - spent_before;
        let remaining_after = limit - spent_after;
        let will_exceed = spent_after > limit;
        let exceed_amount = (spent_after - limit).max(Decimal::ZERO);

        let fifth = limit * Decimal::new(2, 1); // 0.2
        let half = limit * Decimal::new(5, 1); // 0.5

        let (alert_level, message) = if remaining_after < Decimal::ZERO {
            (
                AlertLevel::Critical,
                format!(
                    "This transaction will exceed the budget by {}",
                    remaining_after.abs()
                ),
            )
        } else if remaining_after < fifth {
            (
                AlertLevel::Warning,
                "This transaction will leave less than 20% of the budget".to_string(),
            )
        } else if remaining_after < half {
            (
                AlertLevel::Info,
                "This transaction will use a significant portion of the budget".to_string(),
            )
        } else {
            (
                AlertLevel::Safe,
                "Budget has sufficient funds for this transaction".to_string(),
            )
        };

        Self {
            has_budget: true,
            budget_id: Some(budget_id),
            limit: Some(limit),
            spent_before: Some(spent_before),
            remaining_before: Some(remaining_before),
            remaining_after: Some(remaining_after),
            will_exceed,
            exceed_amount,
            alert_level,
            fallback: false,
            message,
            error: None,
        }
    }

    /// No budget covers this category - a valid, expected outcome.
    pub fn no_budget(category: &str) -> Self {
        Self {
            has_budget: false,
            budget_id: None,
            limit: None,
            spent_before: None,
            remaining_before: None,
            remaining_after: None,
            will_exceed: false,
            exceed_amount: Decimal::ZERO,
            alert_level: AlertLevel::Safe,
            fallback: false,
            message: format!("No budget found for category: {category}"),
            error: None,
        }
    }

    /// Degraded stand-in for an unreachable budget dependency.
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self {
            has_budget: false,
            budget_id: None,
            limit: None,
            spent_before: None,
            remaining_before: None,
            remaining_after: None,
            will_exceed: false,
            exceed_amount: Decimal::ZERO,
            alert_level: AlertLevel::Unknown,
            fallback: true,
            message: "Budget service unavailable - proceeding without budget check".to_string(),
            error: Some(reason.into()),
        }
    }
}
