//! Budget ledger - the owning service for budget aggregates

use crate::error::BudgetError;
use crate::model::{Budget, BudgetStatus};
use crate::notify::NotificationSink;
use crate::store::{BudgetRecord, BudgetStore};
use crate::summary::BudgetSummary;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tally_advisor::BudgetCheck;
use tally_core::{Amount, BudgetPeriod};
use tracing::debug;

/// Creation request for a budget.
#[derive(Debug, Clone)]
pub struct NewBudget {
    pub user_id: i64,
    pub category: String,
    pub limit: Decimal,
    pub period: BudgetPeriod,
    /// Window start; defaults to today when the caller sends nothing.
    pub start_date: Option<NaiveDate>,
    pub description: Option<String>,
}

/// Field changes for a budget update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct BudgetChanges {
    pub category: Option<String>,
    pub limit: Option<Decimal>,
    pub period: Option<BudgetPeriod>,
    pub description: Option<String>,
}

/// Owns budget aggregates: creation, lookup, spending application,
/// edits, logical deletion, and summaries.
///
/// Dependencies are explicit constructor arguments.
pub struct BudgetLedger {
    store: Arc<dyn BudgetStore>,
    notifier: Arc<dyn NotificationSink>,
}

impl BudgetLedger {
    pub fn new(store: Arc<dyn BudgetStore>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self { store, notifier }
    }

    /// Create a budget for `(user, category)`.
    ///
    /// Rejected when the limit is not positive, or when a current
    /// (non-INACTIVE) budget already covers today for that category.
    pub async fn create(&self, new: NewBudget) -> Result<Budget, BudgetError> {
        let limit =
            Amount::new(new.limit).map_err(|_| BudgetError::InvalidLimit(new.limit))?;
        if !limit.is_positive() {
            return Err(BudgetError::InvalidLimit(new.limit));
        }

        let today = Utc::now().date_naive();
        if let Some(existing) = self
            .store
            .find_current(new.user_id, &new.category, today)
            .await?
        {
            debug!(
                budget_id = existing.id,
                category = %new.category,
                "rejecting duplicate budget"
            );
            return Err(BudgetError::DuplicateActiveBudget {
                category: new.category,
            });
        }

        let start_date = new.start_date.unwrap_or(today);
        let record = BudgetRecord {
            user_id: new.user_id,
            category: new.category,
            limit,
            period: new.period,
            start_date,
            end_date: new.period.end_date(start_date),
            description: new.description,
        };

        let budget = self.store.insert(record).await?;
        self.notifier.budget_created(&budget);
        Ok(budget)
    }

    /// The budget whose window covers `as_of`, regardless of EXCEEDED or
    /// COMPLETED status. The single lookup behind both the pre-check and
    /// the spend-apply paths.
    pub async fn find_current(
        &self,
        user_id: i64,
        category: &str,
        as_of: NaiveDate,
    ) -> Result<Option<Budget>, BudgetError> {
        Ok(self.store.find_current(user_id, category, as_of).await?)
    }

    /// Classify a proposed spend without mutating anything.
    pub async fn check_spend(
        &self,
        user_id: i64,
        category: &str,
        amount: Decimal,
    ) -> Result<BudgetCheck, BudgetError> {
        let today = Utc::now().date_naive();
        match self.store.find_current(user_id, category, today).await? {
            Some(budget) => Ok(BudgetCheck::evaluate(
                budget.id,
                budget.limit.value(),
                budget.spent.value(),
                amount,
            )),
            None => Ok(BudgetCheck::no_budget(category)),
        }
    }

    /// Apply a committed spend to the current budget.
    ///
    /// `Ok(None)` when no current budget exists - an expected outcome, not
    /// a failure. The store serializes the increment per budget row; alert
    /// notifications fire afterwards from the post-apply state.
    pub async fn apply_spend(
        &self,
        user_id: i64,
        category: &str,
        amount: Amount,
    ) -> Result<Option<Budget>, BudgetError> {
        let today = Utc::now().date_naive();
        let Some(budget) = self
            .store
            .apply_spend(user_id, category, amount, today)
            .await?
        else {
            return Ok(None);
        };

        if budget.is_exceeded() {
            self.notifier.budget_exceeded(&budget, amount.value());
        } else {
            self.notifier.budget_warning(&budget);
        }

        Ok(Some(budget))
    }

    /// Fetch a budget, enforcing ownership.
    pub async fn budget_by_id(&self, budget_id: i64, user_id: i64) -> Result<Budget, BudgetError> {
        let budget = self
            .store
            .find_by_id(budget_id)
            .await?
            .ok_or(BudgetError::NotFound(budget_id))?;
        if budget.user_id != user_id {
            return Err(BudgetError::Forbidden { budget_id, user_id });
        }
        Ok(budget)
    }

    /// Apply field changes to a budget.
    ///
    /// Changing the period recomputes `end_date` from the EXISTING start
    /// date. Status is recomputed after any change.
    pub async fn update(
        &self,
        budget_id: i64,
        user_id: i64,
        changes: BudgetChanges,
    ) -> Result<Budget, BudgetError> {
        let mut budget = self.budget_by_id(budget_id, user_id).await?;

        if let Some(category) = changes.category {
            budget.category = category;
        }
        if let Some(limit) = changes.limit {
            let limit = Amount::new(limit).map_err(|_| BudgetError::InvalidLimit(limit))?;
            if !limit.is_positive() {
                return Err(BudgetError::InvalidLimit(limit.value()));
            }
            budget.limit = limit;
        }
        if let Some(period) = changes.period {
            budget.period = period;
            budget.end_date = period.end_date(budget.start_date);
        }
        if let Some(description) = changes.description {
            budget.description = Some(description);
        }

        budget.refresh_status(Utc::now().date_naive());
        self.store.save(&budget).await?;
        Ok(budget)
    }

    /// Logical delete: flip the budget to INACTIVE. No hard delete.
    pub async fn delete(&self, budget_id: i64, user_id: i64) -> Result<(), BudgetError> {
        let mut budget = self.budget_by_id(budget_id, user_id).await?;
        budget.status = BudgetStatus::Inactive;
        budget.updated_at = Utc::now();
        self.store.save(&budget).await?;
        Ok(())
    }

    /// All budgets for a user, ordered by id.
    pub async fn budgets_for_user(&self, user_id: i64) -> Result<Vec<Budget>, BudgetError> {
        let mut budgets = self.store.find_by_user(user_id).await?;
        budgets.sort_by_key(|b| b.id);
        Ok(budgets)
    }

    /// Budgets currently ACTIVE (window covers today, not exceeded).
    pub async fn active_budgets(&self, user_id: i64) -> Result<Vec<Budget>, BudgetError> {
        let today = Utc::now().date_naive();
        let mut budgets: Vec<Budget> = self
            .store
            .find_by_user(user_id)
            .await?
            .into_iter()
            .filter(|b| b.derived_status(today) == BudgetStatus::Active)
            .collect();
        budgets.sort_by_key(|b| b.id);
        Ok(budgets)
    }

    /// Budgets whose stored status is EXCEEDED, ordered by id.
    pub async fn exceeded_budgets(&self, user_id: i64) -> Result<Vec<Budget>, BudgetError> {
        let mut budgets = self.store.find_exceeded(user_id).await?;
        budgets.sort_by_key(|b| b.id);
        Ok(budgets)
    }

    /// Every budget (any window) for a user and category, ordered by id.
    pub async fn budgets_for_category(
        &self,
        user_id: i64,
        category: &str,
    ) -> Result<Vec<Budget>, BudgetError> {
        let mut budgets = self
            .store
            .find_by_user_and_category(user_id, category)
            .await?;
        budgets.sort_by_key(|b| b.id);
        Ok(budgets)
    }

    /// Aggregate all of a user's budgets into a summary.
    pub async fn summarize(&self, user_id: i64) -> Result<BudgetSummary, BudgetError> {
        let mut budgets = self.store.find_by_user(user_id).await?;
        budgets.sort_by_key(|b| b.id);
        Ok(BudgetSummary::build(user_id, &budgets, Utc::now().date_naive()))
    }
}
