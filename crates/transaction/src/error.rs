//! Transaction flow errors

use tally_budget::StoreError;
use thiserror::Error;

/// Errors surfaced by the transaction flow.
///
/// Dependency unavailability is deliberately absent: an unreachable
/// budget or identity service degrades the result instead of failing
/// the request.
#[derive(Error, Debug)]
pub enum TransactionError {
    /// The credential was rejected. Nothing was persisted.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A request field was missing or invalid. Nothing was persisted.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// No transaction with this id.
    #[error("Transaction {0} not found")]
    NotFound(i64),

    /// The durability step failed; the transaction cannot be claimed
    /// successful.
    #[error(transparent)]
    Store(#[from] StoreError),
}
