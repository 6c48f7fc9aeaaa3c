//! User-level budget summary

use crate::model::{Budget, BudgetStatus};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Usage percentage at which a budget shows up in the summary warnings.
/// Independent of per-transaction alert levels.
const SUMMARY_WARNING_PERCENT: Decimal = Decimal::from_parts(80, 0, 0, false, 0);

/// One high-usage entry in the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryWarning {
    pub budget_id: i64,
    pub category: String,
    #[serde(rename = "budgetAmount")]
    pub limit: Decimal,
    #[serde(rename = "spentAmount")]
    pub spent: Decimal,
    pub remaining: Decimal,
    pub usage_percentage: Decimal,
    pub status: BudgetStatus,
}

/// Aggregate view of all of a user's budgets.
///
/// Deterministic for a given budget set: budgets are processed in id
/// order and the per-category maps are ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    pub user_id: i64,
    pub total_budgets: usize,
    pub active_budgets: usize,
    pub exceeded_budgets: usize,
    #[serde(rename = "totalBudgetAmount")]
    pub total_limit: Decimal,
    pub total_spent: Decimal,
    pub total_remaining: Decimal,
    pub overall_usage_percentage: Decimal,
    #[serde(rename = "categoryBudgets")]
    pub category_limits: BTreeMap<String, Decimal>,
    #[serde(rename = "categorySpending")]
    pub category_spent: BTreeMap<String, Decimal>,
    pub warnings: Vec<SummaryWarning>,
}

impl BudgetSummary {
    /// Build a summary from budgets sorted by id.
    pub fn build(user_id: i64, budgets: &[Budget], today: NaiveDate) -> Self {
        let mut total_limit = Decimal::ZERO;
        let mut total_spent = Decimal::ZERO;
        let mut category_limits: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut category_spent: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut active = 0usize;
        let mut exceeded = 0usize;
        let mut warnings = Vec::new();

        for budget in budgets {
            total_limit += budget.limit.value();
            total_spent += budget.spent.value();
            *category_limits.entry(budget.category.clone()).or_default() +=
                budget.limit.value();
            *category_spent.entry(budget.category.clone()).or_default() +=
                budget.spent.value();

            let status = budget.derived_status(today);
            match status {
                BudgetStatus::Active => active += 1,
                BudgetStatus::Exceeded => exceeded += 1,
                _ => {}
            }

            if status == BudgetStatus::Active
                && budget.usage_percent() >= SUMMARY_WARNING_PERCENT
            {
                warnings.push(SummaryWarning {
                    budget_id: budget.id,
                    category: budget.category.clone(),
                    limit: budget.limit.value(),
                    spent: budget.spent.value(),
                    remaining: budget.remaining(),
                    usage_percentage: budget.usage_percent().round_dp(2),
                    status,
                });
            }
        }

        let overall_usage = if total_limit.is_zero() {
            Decimal::ZERO
        } else {
            (total_spent / total_limit * Decimal::ONE_HUNDRED).round_dp(2)
        };

        Self {
            user_id,
            total_budgets: budgets.len(),
            active_budgets: active,
            exceeded_budgets: exceeded,
            total_limit,
            total_spent,
            total_remaining: total_limit - total_spent,
            overall_usage_percentage: overall_usage,
            category_limits,
            category_spent,
            warnings,
        }
    }
}
