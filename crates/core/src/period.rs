//! Budget period - window length for a budget
//!
//! A budget covers `[start_date, end_date]` where the end date is derived
//! from the period length.

use chrono::{Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use tracing::debug;

/// Length of a budget window.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, Default,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetPeriod {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    /// Compute the end date of a window starting at `start`.
    pub fn end_date(&self, start: NaiveDate) -> NaiveDate {
        match self {
            BudgetPeriod::Weekly => start + Duration::weeks(1),
            BudgetPeriod::Monthly => start + Months::new(1),
            BudgetPeriod::Yearly => start + Months::new(12),
        }
    }

    /// Parse a period string, falling back to MONTHLY for unknown values.
    ///
    /// Unrecognized periods are accepted rather than rejected so that
    /// clients sending free-form period strings still get a budget; the
    /// fallback is logged.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| {
            debug!(period = s, "unknown budget period, defaulting to MONTHLY");
            BudgetPeriod::Monthly
        })
    }
}
