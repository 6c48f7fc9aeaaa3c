//! Application context - wires everything together

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tally_budget::{BudgetLedger, BudgetStore, LogNotifier, MemoryBudgetStore};
use tally_identity::IdentityGate;
use tally_link::{
    BudgetLink, IdentityLink, LocalBudgetLink, LocalIdentityLink, RemoteBudgetLink,
    RemoteIdentityLink,
};
use tally_store::{SqliteBudgetStore, SqliteTransactionStore};
use tally_transaction::{MemoryTransactionStore, TransactionCoordinator, TransactionStore};
use tracing::info;
use url::Url;

/// Where the context gets its stores and dependencies from.
#[derive(Debug, Clone, Default)]
pub struct ContextConfig {
    /// SQLite database path; memory stores when absent.
    pub database: Option<PathBuf>,
    /// Remote auth service; in-process gate when absent.
    pub auth_url: Option<Url>,
    /// Remote budget service; in-process ledger when absent.
    pub budget_url: Option<Url>,
    /// Per-call timeout for remote dependencies.
    pub remote_timeout: Option<Duration>,
}

/// The wired component graph behind the HTTP handlers.
///
/// Every dependency is an explicit constructor argument of the
/// component that uses it; the context only assembles the graph.
pub struct AppContext {
    pub gate: Arc<IdentityGate>,
    pub ledger: Arc<BudgetLedger>,
    pub coordinator: TransactionCoordinator,
}

impl AppContext {
    pub async fn new(config: ContextConfig) -> anyhow::Result<Self> {
        let (budget_store, transaction_store): (
            Arc<dyn BudgetStore>,
            Arc<dyn TransactionStore>,
        ) = match &config.database {
            Some(path) => {
                info!(path = %path.display(), "using SQLite stores");
                let pool = tally_store::connect(path).await?;
                (
                    Arc::new(SqliteBudgetStore::new(pool.clone())),
                    Arc::new(SqliteTransactionStore::new(pool)),
                )
            }
            None => {
                info!("using in-memory stores");
                (
                    Arc::new(MemoryBudgetStore::new()),
                    Arc::new(MemoryTransactionStore::new()),
                )
            }
        };

        let gate = Arc::new(IdentityGate::new());
        let ledger = Arc::new(BudgetLedger::new(budget_store, Arc::new(LogNotifier)));

        let timeout = config
            .remote_timeout
            .unwrap_or(tally_link::remote::DEFAULT_TIMEOUT);

        let identity_link: Arc<dyn IdentityLink> = match &config.auth_url {
            Some(url) => {
                info!(%url, "identity dependency is remote");
                Arc::new(RemoteIdentityLink::new(url, timeout)?)
            }
            None => Arc::new(LocalIdentityLink::new(Arc::clone(&gate))),
        };

        let budget_link: Arc<dyn BudgetLink> = match &config.budget_url {
            Some(url) => {
                info!(%url, "budget dependency is remote");
                Arc::new(RemoteBudgetLink::new(url, timeout)?)
            }
            None => Arc::new(LocalBudgetLink::new(Arc::clone(&ledger))),
        };

        let coordinator =
            TransactionCoordinator::new(identity_link, budget_link, transaction_store);

        Ok(Self {
            gate,
            ledger,
            coordinator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tally_budget::NewBudget;
    use tally_core::BudgetPeriod;
    use tally_transaction::TransactionRequest;

    async fn record_one(ctx: &AppContext) {
        ctx.ledger
            .create(NewBudget {
                user_id: 1,
                category: "food".to_string(),
                limit: dec!(100),
                period: BudgetPeriod::Monthly,
                start_date: None,
                description: None,
            })
            .await
            .unwrap();

        let token = tally_identity::mint_token(1, "alice", chrono::Duration::hours(1));
        let receipt = ctx
            .coordinator
            .record(
                TransactionRequest {
                    user_id: 1,
                    amount: dec!(30),
                    category: "food".to_string(),
                    description: None,
                },
                &token,
            )
            .await
            .unwrap();

        assert!(receipt.budget_info.has_budget);
        let today = chrono::Utc::now().date_naive();
        let budget = ctx
            .ledger
            .find_current(1, "food", today)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(budget.spent.value(), dec!(30));
    }

    #[tokio::test]
    async fn test_memory_context_end_to_end() {
        let ctx = AppContext::new(ContextConfig::default()).await.unwrap();
        record_one(&ctx).await;
    }

    #[tokio::test]
    async fn test_sqlite_context_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = AppContext::new(ContextConfig {
            database: Some(dir.path().join("tally.db")),
            ..Default::default()
        })
        .await
        .unwrap();
        record_one(&ctx).await;
    }
}
