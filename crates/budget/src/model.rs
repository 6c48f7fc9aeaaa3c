//! Budget aggregate and status derivation

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use tally_core::{Amount, BudgetPeriod};

/// Lifecycle state of a budget.
///
/// ACTIVE, EXCEEDED and COMPLETED are derived from the aggregate's data;
/// INACTIVE is terminal and only reachable through an explicit delete.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetStatus {
    Active,
    Exceeded,
    Completed,
    Inactive,
}

/// A per-category spending cap over a `[start_date, end_date]` window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: i64,
    pub user_id: i64,
    pub category: String,
    /// The cap. Creation validation guarantees this is > 0.
    #[serde(rename = "amount")]
    pub limit: Amount,
    pub spent: Amount,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: BudgetStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    /// Headroom left under the cap. Negative once the budget is exceeded.
    pub fn remaining(&self) -> Decimal {
        self.limit.value() - self.spent.value()
    }

    /// Spent as a percentage of the limit.
    pub fn usage_percent(&self) -> Decimal {
        if self.limit.value().is_zero() {
            return Decimal::ZERO;
        }
        self.spent.value() / self.limit.value() * Decimal::ONE_HUNDRED
    }

    /// Whether spending has gone over the cap.
    pub fn is_exceeded(&self) -> bool {
        self.spent.value() > self.limit.value()
    }

    /// Whether the window contains `date` (inclusive on both ends).
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Derive the status from `(spent, limit, end_date, today)`.
    ///
    /// INACTIVE is terminal and overrides the derivation. The derivation
    /// itself is a pure function: calling it twice with unchanged inputs
    /// yields the same status.
    pub fn derived_status(&self, today: NaiveDate) -> BudgetStatus {
        if self.status == BudgetStatus::Inactive {
            return BudgetStatus::Inactive;
        }
        if self.is_exceeded() {
            BudgetStatus::Exceeded
        } else if today > self.end_date {
            BudgetStatus::Completed
        } else {
            BudgetStatus::Active
        }
    }

    /// Recompute and store the derived status, bumping `updated_at`.
    pub fn refresh_status(&mut self, today: NaiveDate) {
        self.status = self.derived_status(today);
        self.updated_at = Utc::now();
    }
}
