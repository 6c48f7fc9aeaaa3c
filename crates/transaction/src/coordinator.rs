//! Transaction coordinator - the per-request recording flow
//!
//! Steps are strictly sequential: AuthCheck → PreCheck → Persist →
//! ApplySpend → Respond. Only AuthCheck and Persist can fail the
//! request; budget trouble on either side of the durability boundary
//! degrades the result instead.

use crate::error::TransactionError;
use crate::model::{Transaction, TransactionRequest, INCOME_CATEGORY};
use crate::store::{TransactionRecord, TransactionStore};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tally_advisor::BudgetCheck;
use tally_link::{BudgetLink, IdentityLink};
use tracing::{info, warn};

/// Budget-side view attached to a transaction receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetInfo {
    pub has_budget: bool,
    pub will_exceed_budget: bool,
    pub is_fallback: bool,
    pub budget_message: String,
    pub budget_check: BudgetCheck,
}

/// Outcome of recording a transaction: the persisted transaction plus
/// the pre-check verdict, fallback flag included, so callers can see
/// degraded-mode operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub message: String,
    pub budget_info: BudgetInfo,
}

/// Orchestrates one transaction request against the identity and budget
/// dependencies. Holds no per-request state.
pub struct TransactionCoordinator {
    identity: Arc<dyn IdentityLink>,
    budget: Arc<dyn BudgetLink>,
    store: Arc<dyn TransactionStore>,
}

impl TransactionCoordinator {
    pub fn new(
        identity: Arc<dyn IdentityLink>,
        budget: Arc<dyn BudgetLink>,
        store: Arc<dyn TransactionStore>,
    ) -> Self {
        Self {
            identity,
            budget,
            store,
        }
    }

    /// Record a transaction.
    ///
    /// A rejected credential or invalid request persists nothing. Once
    /// the store accepts the transaction it is final: a failed budget
    /// spend-apply afterwards is logged and swallowed, leaving the
    /// budget's `spent` stale until a later write catches up.
    pub async fn record(
        &self,
        request: TransactionRequest,
        token: &str,
    ) -> Result<TransactionReceipt, TransactionError> {
        let amount = request.validate()?;

        // AuthCheck - fatal on rejection, nothing persisted.
        let auth = self.identity.validate(token).await;
        if !auth.valid {
            return Err(TransactionError::Unauthorized(
                auth.error.unwrap_or_else(|| "Invalid token".to_string()),
            ));
        }

        // PreCheck - degraded results pass straight through; an
        // unreachable budget service must never block the recording.
        let check = self
            .budget
            .check_spend(token, request.user_id, &request.category, request.amount)
            .await;

        // Persist - the durability boundary.
        let transaction = self
            .store
            .save(TransactionRecord {
                user_id: request.user_id,
                amount,
                category: request.category.clone(),
                description: request.description.clone(),
            })
            .await?;

        info!(
            transaction_id = transaction.id,
            user_id = transaction.user_id,
            category = %transaction.category,
            amount = %transaction.amount,
            fallback = check.fallback,
            "transaction recorded"
        );

        // ApplySpend - only when the pre-check actually saw a budget.
        // The transaction is already committed; failure here must not
        // fail the request.
        if check.has_budget && !check.fallback {
            let outcome = self
                .budget
                .apply_spend(token, request.user_id, &request.category, request.amount)
                .await;
            if !outcome.success {
                warn!(
                    transaction_id = transaction.id,
                    category = %transaction.category,
                    fallback = outcome.fallback,
                    message = outcome.message.as_deref().unwrap_or(""),
                    "budget spend-apply did not land; budget is stale"
                );
            }
        }

        let message = if check.fallback {
            "Transaction created successfully (budget service unavailable)".to_string()
        } else {
            "Transaction created successfully".to_string()
        };

        Ok(TransactionReceipt {
            transaction,
            message,
            budget_info: BudgetInfo {
                has_budget: check.has_budget,
                will_exceed_budget: check.has_budget && check.will_exceed,
                is_fallback: check.fallback,
                budget_message: check.message.clone(),
                budget_check: check,
            },
        })
    }

    /// All transactions for a user. Token-gated.
    pub async fn transactions_for_user(
        &self,
        user_id: i64,
        token: &str,
    ) -> Result<Vec<Transaction>, TransactionError> {
        self.authorize(token).await?;
        Ok(self.store.find_by_user(user_id).await?)
    }

    /// Transactions for a user in one category. Token-gated.
    pub async fn transactions_for_category(
        &self,
        user_id: i64,
        category: &str,
        token: &str,
    ) -> Result<Vec<Transaction>, TransactionError> {
        self.authorize(token).await?;
        Ok(self
            .store
            .find_by_user_and_category(user_id, category)
            .await?)
    }

    /// A single transaction by id. Token-gated.
    pub async fn transaction_by_id(
        &self,
        id: i64,
        token: &str,
    ) -> Result<Transaction, TransactionError> {
        self.authorize(token).await?;
        self.store
            .find_by_id(id)
            .await?
            .ok_or(TransactionError::NotFound(id))
    }

    /// Net balance: INCOME transactions credit, everything else debits.
    pub async fn balance_for_user(
        &self,
        user_id: i64,
        token: &str,
    ) -> Result<Decimal, TransactionError> {
        let transactions = self.transactions_for_user(user_id, token).await?;
        Ok(transactions.iter().fold(Decimal::ZERO, |acc, t| {
            if t.category == INCOME_CATEGORY {
                acc + t.amount.value()
            } else {
                acc - t.amount.value()
            }
        }))
    }

    /// Per-category spend totals. Token-gated.
    pub async fn category_summary(
        &self,
        user_id: i64,
        token: &str,
    ) -> Result<BTreeMap<String, Decimal>, TransactionError> {
        let transactions = self.transactions_for_user(user_id, token).await?;
        let mut summary: BTreeMap<String, Decimal> = BTreeMap::new();
        for t in &transactions {
            *summary.entry(t.category.clone()).or_default() += t.amount.value();
        }
        Ok(summary)
    }

    async fn authorize(&self, token: &str) -> Result<(), TransactionError> {
        let auth = self.identity.validate(token).await;
        if !auth.valid {
            return Err(TransactionError::Unauthorized(
                auth.error.unwrap_or_else(|| "Invalid token".to_string()),
            ));
        }
        Ok(())
    }
}
