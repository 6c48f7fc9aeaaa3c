//! Transaction persistence boundary

use crate::model::{Transaction, TransactionStatus};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tally_budget::StoreError;
use tally_core::Amount;
use tokio::sync::Mutex;

/// Insert payload - the store assigns id, date and status.
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    pub user_id: i64,
    pub amount: Amount,
    pub category: String,
    pub description: Option<String>,
}

/// Storage contract for recorded transactions. Durable and synchronous:
/// once `save` returns, the transaction is final.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn save(&self, record: TransactionRecord) -> Result<Transaction, StoreError>;

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Transaction>, StoreError>;

    async fn find_by_user_and_category(
        &self,
        user_id: i64,
        category: &str,
    ) -> Result<Vec<Transaction>, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Transaction>, StoreError>;
}

/// In-memory transaction store.
#[derive(Default)]
pub struct MemoryTransactionStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    next_id: i64,
    transactions: BTreeMap<i64, Transaction>,
}

impl MemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionStore for MemoryTransactionStore {
    async fn save(&self, record: TransactionRecord) -> Result<Transaction, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let transaction = Transaction {
            id: inner.next_id,
            user_id: record.user_id,
            amount: record.amount,
            category: record.category,
            description: record.description,
            date: Utc::now(),
            status: TransactionStatus::Completed,
        };
        inner.transactions.insert(transaction.id, transaction.clone());
        Ok(transaction)
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Transaction>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .transactions
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_user_and_category(
        &self,
        user_id: i64,
        category: &str,
    ) -> Result<Vec<Transaction>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .transactions
            .values()
            .filter(|t| t.user_id == user_id && t.category == category)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Transaction>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.transactions.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(user_id: i64, category: &str, amount: rust_decimal::Decimal) -> TransactionRecord {
        TransactionRecord {
            user_id,
            amount: Amount::new(amount).unwrap(),
            category: category.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_save_assigns_id_and_completes() {
        let store = MemoryTransactionStore::new();
        let t = store.save(record(1, "food", dec!(20))).await.unwrap();
        assert_eq!(t.id, 1);
        assert_eq!(t.status, TransactionStatus::Completed);
    }

    #[tokio::test]
    async fn test_find_by_user_and_category() {
        let store = MemoryTransactionStore::new();
        store.save(record(1, "food", dec!(20))).await.unwrap();
        store.save(record(1, "fuel", dec!(30))).await.unwrap();
        store.save(record(2, "food", dec!(40))).await.unwrap();

        assert_eq!(store.find_by_user(1).await.unwrap().len(), 2);
        let food = store.find_by_user_and_category(1, "food").await.unwrap();
        assert_eq!(food.len(), 1);
        assert_eq!(food[0].amount.value(), dec!(20));
    }
}
