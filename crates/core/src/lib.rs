//! Tally core domain types
//!
//! Shared primitives for the budget and transaction services:
//! - [`Amount`]: non-negative decimal for money values
//! - [`BudgetPeriod`]: budget window length and end-date computation

pub mod amount;
pub mod period;

pub use amount::{Amount, AmountError};
pub use period::BudgetPeriod;
