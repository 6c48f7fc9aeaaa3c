//! Schema initialization

use sqlx::SqlitePool;
use tally_budget::StoreError;

/// Create tables and indexes if they do not exist.
pub async fn init(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS budgets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            category TEXT NOT NULL,
            limit_amount TEXT NOT NULL,
            spent TEXT NOT NULL DEFAULT '0',
            period TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'ACTIVE',
            description TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(StoreError::backend)?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_budgets_user_category
        ON budgets(user_id, category)
        "#,
    )
    .execute(pool)
    .await
    .map_err(StoreError::backend)?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            amount TEXT NOT NULL,
            category TEXT NOT NULL,
            description TEXT,
            date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'COMPLETED'
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(StoreError::backend)?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_transactions_user
        ON transactions(user_id, category)
        "#,
    )
    .execute(pool)
    .await
    .map_err(StoreError::backend)?;

    Ok(())
}
