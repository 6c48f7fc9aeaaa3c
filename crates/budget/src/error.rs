//! Budget errors

use rust_decimal::Decimal;
use std::fmt::Display;
use thiserror::Error;

/// Failure in a storage backend.
///
/// Store implementations live in other crates; they fold their native
/// errors into this type via [`StoreError::backend`].
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage backend failure: {0}")]
    Backend(String),

    #[error("write contention on budget {budget_id} not resolved after {attempts} attempts")]
    Contention { budget_id: i64, attempts: u32 },
}

impl StoreError {
    pub fn backend(err: impl Display) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Errors from budget ledger operations
#[derive(Error, Debug)]
pub enum BudgetError {
    #[error("An active budget already exists for category {category}")]
    DuplicateActiveBudget { category: String },

    #[error("Budget {0} not found")]
    NotFound(i64),

    #[error("Budget {budget_id} does not belong to user {user_id}")]
    Forbidden { budget_id: i64, user_id: i64 },

    #[error("Budget limit must be greater than zero, got {0}")]
    InvalidLimit(Decimal),

    #[error(transparent)]
    Store(#[from] StoreError),
}
