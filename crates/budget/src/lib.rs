//! Tally budget ledger
//!
//! Owns the budget aggregate: period-bounded lifecycle
//! (ACTIVE → EXCEEDED/COMPLETED, INACTIVE on delete), spending
//! application under per-budget write serialization, and user-level
//! summaries. Persistence is behind [`BudgetStore`]; alerts go through
//! the fire-and-forget [`NotificationSink`].

pub mod error;
pub mod ledger;
pub mod model;
pub mod notify;
pub mod store;
pub mod summary;

pub use error::{BudgetError, StoreError};
pub use ledger::{BudgetChanges, BudgetLedger, NewBudget};
pub use model::{Budget, BudgetStatus};
pub use notify::{LogNotifier, NotificationSink};
pub use store::{BudgetRecord, BudgetStore, MemoryBudgetStore};
pub use summary::{BudgetSummary, SummaryWarning};
