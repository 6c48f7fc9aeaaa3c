//! SQLite transaction repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tally_budget::StoreError;
use tally_core::Amount;
use tally_transaction::{Transaction, TransactionRecord, TransactionStatus, TransactionStore};

/// Transaction repository over a SQLite pool.
pub struct SqliteTransactionStore {
    pool: SqlitePool,
}

impl SqliteTransactionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn transaction_from_row(row: &SqliteRow) -> Result<Transaction, StoreError> {
    let amount: String = row.get("amount");
    let amount: Decimal = amount
        .parse()
        .map_err(|_| StoreError::Backend(format!("bad decimal in amount: {amount}")))?;
    let date: String = row.get("date");
    let date: DateTime<Utc> = DateTime::parse_from_rfc3339(&date)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| StoreError::Backend(format!("bad timestamp in date: {date}")))?;
    let status: String = row.get("status");

    Ok(Transaction {
        id: row.get("id"),
        user_id: row.get("user_id"),
        amount: Amount::new(amount).map_err(StoreError::backend)?,
        category: row.get("category"),
        description: row.get("description"),
        date,
        status: status
            .parse::<TransactionStatus>()
            .map_err(|_| StoreError::Backend(format!("bad status: {status}")))?,
    })
}

#[async_trait]
impl TransactionStore for SqliteTransactionStore {
    async fn save(&self, record: TransactionRecord) -> Result<Transaction, StoreError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO transactions (user_id, amount, category, description, date, status)
            VALUES (?, ?, ?, ?, ?, 'COMPLETED')
            "#,
        )
        .bind(record.user_id)
        .bind(record.amount.value().to_string())
        .bind(&record.category)
        .bind(&record.description)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(Transaction {
            id: result.last_insert_rowid(),
            user_id: record.user_id,
            amount: record.amount,
            category: record.category,
            description: record.description,
            date: now,
            status: TransactionStatus::Completed,
        })
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Transaction>, StoreError> {
        let rows = sqlx::query("SELECT * FROM transactions WHERE user_id = ? ORDER BY id")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        rows.iter().map(transaction_from_row).collect()
    }

    async fn find_by_user_and_category(
        &self,
        user_id: i64,
        category: &str,
    ) -> Result<Vec<Transaction>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM transactions WHERE user_id = ? AND category = ? ORDER BY id",
        )
        .bind(user_id)
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;
        rows.iter().map(transaction_from_row).collect()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Transaction>, StoreError> {
        let row = sqlx::query("SELECT * FROM transactions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        row.as_ref().map(transaction_from_row).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    async fn store() -> (tempfile::TempDir, SqliteTransactionStore) {
        let dir = tempfile::tempdir().unwrap();
        let pool = crate::connect(dir.path().join("tally.db")).await.unwrap();
        (dir, SqliteTransactionStore::new(pool))
    }

    fn record(user_id: i64, category: &str, amount: Decimal) -> TransactionRecord {
        TransactionRecord {
            user_id,
            amount: Amount::new(amount).unwrap(),
            category: category.to_string(),
            description: Some("coffee".to_string()),
        }
    }

    #[tokio::test]
    async fn test_save_and_roundtrip() {
        let (_dir, store) = store().await;
        let saved = store.save(record(1, "food", dec!(4.5))).await.unwrap();
        assert_eq!(saved.status, TransactionStatus::Completed);

        let loaded = store.find_by_id(saved.id).await.unwrap().unwrap();
        assert_eq!(loaded.amount.value(), dec!(4.5));
        assert_eq!(loaded.description.as_deref(), Some("coffee"));
    }

    #[tokio::test]
    async fn test_queries_by_user_and_category() {
        let (_dir, store) = store().await;
        store.save(record(1, "food", dec!(10))).await.unwrap();
        store.save(record(1, "fuel", dec!(20))).await.unwrap();
        store.save(record(2, "food", dec!(30))).await.unwrap();

        assert_eq!(store.find_by_user(1).await.unwrap().len(), 2);
        assert_eq!(
            store.find_by_user_and_category(1, "fuel").await.unwrap()[0]
                .amount
                .value(),
            dec!(20)
        );
        assert!(store.find_by_id(99).await.unwrap().is_none());
    }
}
