//! Budget persistence boundary
//!
//! [`BudgetStore`] is the storage contract; [`MemoryBudgetStore`] is the
//! in-process implementation used by tests and single-process deployments.
//! The SQLite implementation lives in the store crate.

use crate::error::StoreError;
use crate::model::{Budget, BudgetStatus};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tally_core::Amount;
use tokio::sync::Mutex;

/// Insert payload - everything but the store-assigned id and timestamps.
#[derive(Debug, Clone)]
pub struct BudgetRecord {
    pub user_id: i64,
    pub category: String,
    pub limit: Amount,
    pub period: tally_core::BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: Option<String>,
}

/// Storage contract for budget aggregates.
///
/// The one non-negotiable requirement is `apply_spend`: the
/// find-increment-recompute-save sequence MUST be serialized per budget
/// row so that two concurrent spends in the same category never lose an
/// increment.
#[async_trait]
pub trait BudgetStore: Send + Sync {
    /// Insert a new budget; the store assigns the id and timestamps.
    async fn insert(&self, record: BudgetRecord) -> Result<Budget, StoreError>;

    /// Overwrite an existing budget row.
    async fn save(&self, budget: &Budget) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Budget>, StoreError>;

    /// The budget (not INACTIVE) whose window covers `as_of` for this
    /// user and category. EXCEEDED and COMPLETED budgets are returned.
    async fn find_current(
        &self,
        user_id: i64,
        category: &str,
        as_of: NaiveDate,
    ) -> Result<Option<Budget>, StoreError>;

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Budget>, StoreError>;

    async fn find_by_user_and_category(
        &self,
        user_id: i64,
        category: &str,
    ) -> Result<Vec<Budget>, StoreError>;

    async fn find_exceeded(&self, user_id: i64) -> Result<Vec<Budget>, StoreError>;

    /// Atomically add `amount` to the current budget's `spent`, recompute
    /// its status as of `today`, persist, and return the updated budget.
    /// `Ok(None)` when no current budget exists.
    async fn apply_spend(
        &self,
        user_id: i64,
        category: &str,
        amount: Amount,
        today: NaiveDate,
    ) -> Result<Option<Budget>, StoreError>;
}

/// In-memory budget store.
///
/// A single mutex over the whole map serializes every read-modify-write,
/// which trivially satisfies the per-row serialization requirement.
#[derive(Default)]
pub struct MemoryBudgetStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    next_id: i64,
    budgets: BTreeMap<i64, Budget>,
}

impl MemoryBudgetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn current_of<'a>(
    budgets: impl Iterator<Item = &'a Budget>,
    user_id: i64,
    category: &str,
    as_of: NaiveDate,
) -> Option<&'a Budget> {
    budgets
        .filter(|b| {
            b.user_id == user_id
                && b.category == category
                && b.status != BudgetStatus::Inactive
                && b.covers(as_of)
        })
        .min_by_key(|b| b.id)
}

#[async_trait]
impl BudgetStore for MemoryBudgetStore {
    async fn insert(&self, record: BudgetRecord) -> Result<Budget, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let now = chrono::Utc::now();
        let budget = Budget {
            id: inner.next_id,
            user_id: record.user_id,
            category: record.category,
            limit: record.limit,
            spent: Amount::ZERO,
            period: record.period,
            start_date: record.start_date,
            end_date: record.end_date,
            status: BudgetStatus::Active,
            description: record.description,
            created_at: now,
            updated_at: now,
        };
        inner.budgets.insert(budget.id, budget.clone());
        Ok(budget)
    }

    async fn save(&self, budget: &Budget) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.budgets.insert(budget.id, budget.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Budget>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.budgets.get(&id).cloned())
    }

    async fn find_current(
        &self,
        user_id: i64,
        category: &str,
        as_of: NaiveDate,
    ) -> Result<Option<Budget>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(current_of(inner.budgets.values(), user_id, category, as_of).cloned())
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Budget>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .budgets
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_user_and_category(
        &self,
        user_id: i64,
        category: &str,
    ) -> Result<Vec<Budget>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .budgets
            .values()
            .filter(|b| b.user_id == user_id && b.category == category)
            .cloned()
            .collect())
    }

    async fn find_exceeded(&self, user_id: i64) -> Result<Vec<Budget>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .budgets
            .values()
            .filter(|b| b.user_id == user_id && b.status == BudgetStatus::Exceeded)
            .cloned()
            .collect())
    }

    async fn apply_spend(
        &self,
        user_id: i64,
        category: &str,
        amount: Amount,
        today: NaiveDate,
    ) -> Result<Option<Budget>, StoreError> {
        let mut inner = self.inner.lock().await;
        let Some(id) = current_of(inner.budgets.values(), user_id, category, today).map(|b| b.id)
        else {
            return Ok(None);
        };
        // The map stays locked for the whole read-modify-write.
        let budget = inner
            .budgets
            .get_mut(&id)
            .ok_or_else(|| StoreError::backend("budget vanished under lock"))?;
        let new_spent = budget
            .spent
            .checked_add(&amount)
            .ok_or_else(|| StoreError::backend("spent overflow"))?;
        budget.spent = new_spent;
        budget.refresh_status(today);
        Ok(Some(budget.clone()))
    }
}
