//! Notification sink - fire-and-forget budget alerts
//!
//! Sinks must never propagate failure into the ledger; anything that can
//! go wrong inside a sink stays inside the sink.

use crate::model::Budget;
use rust_decimal::Decimal;
use tracing::{info, warn};

/// Receiver of budget lifecycle alerts.
pub trait NotificationSink: Send + Sync {
    /// A budget was created.
    fn budget_created(&self, budget: &Budget);

    /// Spending moved but stayed within the cap. The sink decides whether
    /// usage is high enough to be worth surfacing.
    fn budget_warning(&self, budget: &Budget);

    /// Spending went over the cap; `amount` is the spend that tipped it.
    fn budget_exceeded(&self, budget: &Budget, amount: Decimal);
}

/// Structured-log sink.
pub struct LogNotifier;

/// Usage percentage at which a warning becomes worth emitting.
const WARNING_USAGE_PERCENT: Decimal = Decimal::from_parts(80, 0, 0, false, 0);

impl NotificationSink for LogNotifier {
    fn budget_created(&self, budget: &Budget) {
        info!(
            user_id = budget.user_id,
            category = %budget.category,
            limit = %budget.limit,
            period = %budget.period,
            "budget created"
        );
    }

    fn budget_warning(&self, budget: &Budget) {
        let usage = budget.usage_percent();
        if usage >= WARNING_USAGE_PERCENT {
            warn!(
                user_id = budget.user_id,
                category = %budget.category,
                limit = %budget.limit,
                spent = %budget.spent,
                usage = %usage.round_dp(2),
                "budget usage high"
            );
        }
    }

    fn budget_exceeded(&self, budget: &Budget, amount: Decimal) {
        warn!(
            user_id = budget.user_id,
            category = %budget.category,
            limit = %budget.limit,
            spent = %budget.spent,
            transaction_amount = %amount,
            exceeded_by = %(budget.spent.value() - budget.limit.value()),
            "budget exceeded"
        );
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::Mutex;

    /// Records which alerts fired; for ledger tests.
    #[derive(Default)]
    pub struct RecordingSink {
        pub events: Mutex<Vec<String>>,
    }

    impl NotificationSink for RecordingSink {
        fn budget_created(&self, budget: &Budget) {
            self.events
                .lock()
                .unwrap()
                .push(format!("created:{}", budget.category));
        }

        fn budget_warning(&self, budget: &Budget) {
            if budget.usage_percent() >= WARNING_USAGE_PERCENT {
                self.events
                    .lock()
                    .unwrap()
                    .push(format!("warning:{}", budget.category));
            }
        }

        fn budget_exceeded(&self, budget: &Budget, _amount: Decimal) {
            self.events
                .lock()
                .unwrap()
                .push(format!("exceeded:{}", budget.category));
        }
    }
}
