//! SQLite budget repository

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tally_budget::{Budget, BudgetRecord, BudgetStatus, BudgetStore, StoreError};
use tally_core::{Amount, BudgetPeriod};
use tracing::debug;

/// How many times a contended spend-apply is retried before giving up.
/// Must exceed any plausible number of writers racing on one budget.
const SPEND_RETRIES: u32 = 32;

/// Budget repository over a SQLite pool.
pub struct SqliteBudgetStore {
    pool: SqlitePool,
}

impl SqliteBudgetStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn parse_decimal(raw: &str, column: &str) -> Result<Decimal, StoreError> {
    raw.parse()
        .map_err(|_| StoreError::Backend(format!("bad decimal in {column}: {raw}")))
}

fn parse_date(raw: &str, column: &str) -> Result<NaiveDate, StoreError> {
    raw.parse()
        .map_err(|_| StoreError::Backend(format!("bad date in {column}: {raw}")))
}

fn parse_timestamp(raw: &str, column: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| StoreError::Backend(format!("bad timestamp in {column}: {raw}")))
}

fn budget_from_row(row: &SqliteRow) -> Result<Budget, StoreError> {
    let limit: String = row.get("limit_amount");
    let spent: String = row.get("spent");
    let period: String = row.get("period");
    let status: String = row.get("status");
    let start_date: String = row.get("start_date");
    let end_date: String = row.get("end_date");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Budget {
        id: row.get("id"),
        user_id: row.get("user_id"),
        category: row.get("category"),
        limit: Amount::new(parse_decimal(&limit, "limit_amount")?)
            .map_err(StoreError::backend)?,
        spent: Amount::new(parse_decimal(&spent, "spent")?).map_err(StoreError::backend)?,
        period: period
            .parse()
            .map_err(|_| StoreError::Backend(format!("bad period: {period}")))?,
        start_date: parse_date(&start_date, "start_date")?,
        end_date: parse_date(&end_date, "end_date")?,
        status: status
            .parse()
            .map_err(|_| StoreError::Backend(format!("bad status: {status}")))?,
        description: row.get("description"),
        created_at: parse_timestamp(&created_at, "created_at")?,
        updated_at: parse_timestamp(&updated_at, "updated_at")?,
    })
}

#[async_trait]
impl BudgetStore for SqliteBudgetStore {
    async fn insert(&self, record: BudgetRecord) -> Result<Budget, StoreError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO budgets
                (user_id, category, limit_amount, spent, period,
                 start_date, end_date, status, description, created_at, updated_at)
            VALUES (?, ?, ?, '0', ?, ?, ?, 'ACTIVE', ?, ?, ?)
            "#,
        )
        .bind(record.user_id)
        .bind(&record.category)
        .bind(record.limit.value().to_string())
        .bind(record.period.to_string())
        .bind(record.start_date.to_string())
        .bind(record.end_date.to_string())
        .bind(&record.description)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(Budget {
            id: result.last_insert_rowid(),
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
        })
    }

    async fn save(&self, budget: &Budget) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE budgets
            SET category = ?, limit_amount = ?, spent = ?, period = ?,
                start_date = ?, end_date = ?, status = ?, description = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&budget.category)
        .bind(budget.limit.value().to_string())
        .bind(budget.spent.value().to_string())
        .bind(budget.period.to_string())
        .bind(budget.start_date.to_string())
        .bind(budget.end_date.to_string())
        .bind(budget.status.to_string())
        .bind(&budget.description)
        .bind(budget.updated_at.to_rfc3339())
        .bind(budget.id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Budget>, StoreError> {
        let row = sqlx::query("SELECT * FROM budgets WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        row.as_ref().map(budget_from_row).transpose()
    }

    async fn find_current(
        &self,
        user_id: i64,
        category: &str,
        as_of: NaiveDate,
    ) -> Result<Option<Budget>, StoreError> {
        let as_of = as_of.to_string();
        let row = sqlx::query(
            r#"
            SELECT * FROM budgets
            WHERE user_id = ? AND category = ? AND status != 'INACTIVE'
              AND start_date <= ? AND end_date >= ?
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(category)
        .bind(&as_of)
        .bind(&as_of)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;
        row.as_ref().map(budget_from_row).transpose()
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Budget>, StoreError> {
        let rows = sqlx::query("SELECT * FROM budgets WHERE user_id = ? ORDER BY id")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        rows.iter().map(budget_from_row).collect()
    }

    async fn find_by_user_and_category(
        &self,
        user_id: i64,
        category: &str,
    ) -> Result<Vec<Budget>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM budgets WHERE user_id = ? AND category = ? ORDER BY id",
        )
        .bind(user_id)
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;
        rows.iter().map(budget_from_row).collect()
    }

    async fn find_exceeded(&self, user_id: i64) -> Result<Vec<Budget>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM budgets WHERE user_id = ? AND status = 'EXCEEDED' ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;
        rows.iter().map(budget_from_row).collect()
    }

    async fn apply_spend(
        &self,
        user_id: i64,
        category: &str,
        amount: Amount,
        today: NaiveDate,
    ) -> Result<Option<Budget>, StoreError> {
        // Compare-and-swap on the previous `spent` value: the UPDATE only
        // lands if no other writer got in between the read and the write.
        let mut budget_id = 0;
        for attempt in 0..SPEND_RETRIES {
            let Some(budget) = self.find_current(user_id, category, today).await? else {
                return Ok(None);
            };
            budget_id = budget.id;

            let old_spent = budget.spent.value().to_string();
            let mut updated = budget;
            updated.spent = updated
                .spent
                .checked_add(&amount)
                .ok_or_else(|| StoreError::backend("spent overflow"))?;
            updated.refresh_status(today);

            let result = sqlx::query(
                r#"
                UPDATE budgets
                SET spent = ?, status = ?, updated_at = ?
                WHERE id = ? AND spent = ?
                "#,
            )
            .bind(updated.spent.value().to_string())
            .bind(updated.status.to_string())
            .bind(updated.updated_at.to_rfc3339())
            .bind(updated.id)
            .bind(&old_spent)
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;

            if result.rows_affected() == 1 {
                return Ok(Some(updated));
            }
            debug!(budget_id, attempt, "spend-apply lost the race, retrying");
        }

        Err(StoreError::Contention {
            budget_id,
            attempts: SPEND_RETRIES,
        })
    }
}
