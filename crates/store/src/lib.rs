//! Tally SQLite persistence
//!
//! Repository implementations of the budget and transaction store
//! traits. Decimals are stored as TEXT and parsed back; dates as
//! ISO-8601 TEXT (which compares correctly as strings).

pub mod budget_store;
pub mod schema;
pub mod transaction_store;

pub use budget_store::SqliteBudgetStore;
pub use transaction_store::SqliteTransactionStore;

use sqlx::SqlitePool;
use std::path::Path;
use tally_budget::StoreError;

/// Open (creating if needed) the database at `db_path` and initialize
/// the schema.
pub async fn connect(db_path: impl AsRef<Path>) -> Result<SqlitePool, StoreError> {
    let db_url = format!("sqlite:{}?mode=rwc", db_path.as_ref().display());
    let pool = SqlitePool::connect(&db_url)
        .await
        .map_err(StoreError::backend)?;
    schema::init(&pool).await?;
    Ok(pool)
}
