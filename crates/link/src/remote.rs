//! Remote link adapters - HTTP clients with fallback conversion
//!
//! Wraps `reqwest::Client` with the service endpoints and converts every
//! transport fault (timeout, connect error, non-success status, bad
//! body) into the degraded result for that call. The original caller's
//! bearer credential is forwarded unchanged.

use crate::boundary::{BudgetLink, IdentityLink, SpendOutcome};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tally_advisor::BudgetCheck;
use tally_identity::TokenValidation;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Construction-time errors. Runtime transport faults never surface as
/// errors - they become fallback results.
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("invalid service URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Default per-call timeout for dependency requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

fn build_client(timeout: Duration) -> Result<reqwest::Client, LinkError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

async fn post_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: &Url,
    token: &str,
    body: &serde_json::Value,
) -> Result<T, String> {
    let response = http
        .post(url.clone())
        .bearer_auth(token)
        .json(body)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("{url} returned {status}"));
    }

    response.json::<T>().await.map_err(|e| e.to_string())
}

/// [`IdentityLink`] over a remote auth service.
pub struct RemoteIdentityLink {
    http: reqwest::Client,
    validate_url: Url,
    validate_user_url: Url,
}

impl RemoteIdentityLink {
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, LinkError> {
        Ok(Self {
            http: build_client(timeout)?,
            validate_url: base_url.join("/api/auth/validate")?,
            validate_user_url: base_url.join("/api/auth/validate-user")?,
        })
    }
}

#[async_trait]
impl IdentityLink for RemoteIdentityLink {
    async fn validate(&self, token: &str) -> TokenValidation {
        let body = json!({ "token": token });
        match post_json::<TokenValidation>(&self.http, &self.validate_url, token, &body).await {
            Ok(result) => result,
            Err(err) => {
                warn!(%err, "auth service unreachable, refusing request");
                TokenValidation::invalid("Auth service temporarily unavailable")
            }
        }
    }

    async fn validate_for_subject(&self, token: &str, expected_user_id: i64) -> TokenValidation {
        let body = json!({ "token": token, "userId": expected_user_id });
        match post_json::<TokenValidation>(&self.http, &self.validate_user_url, token, &body).await
        {
            Ok(result) => result,
            Err(err) => {
                warn!(%err, "auth service unreachable, refusing request");
                TokenValidation::invalid("Auth service temporarily unavailable")
            }
        }
    }
}

/// [`BudgetLink`] over a remote budget service.
pub struct RemoteBudgetLink {
    http: reqwest::Client,
    check_url: Url,
    spend_url: Url,
}

impl RemoteBudgetLink {
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, LinkError> {
        Ok(Self {
            http: build_client(timeout)?,
            check_url: base_url.join("/api/budgets/check-transaction")?,
            spend_url: base_url.join("/api/budgets/add-spending")?,
        })
    }
}

#[async_trait]
impl BudgetLink for RemoteBudgetLink {
    async fn check_spend(
        &self,
        token: &str,
        user_id: i64,
        category: &str,
        amount: Decimal,
    ) -> BudgetCheck {
        let body = json!({ "userId": user_id, "category": category, "amount": amount });
        match post_json::<BudgetCheck>(&self.http, &self.check_url, token, &body).await {
            Ok(check) => {
                debug!(user_id, category, alert = %check.alert_level, "budget pre-check");
                check
            }
            Err(err) => {
                warn!(user_id, category, %err, "budget pre-check degraded");
                BudgetCheck::degraded(err)
            }
        }
    }

    async fn apply_spend(
        &self,
        token: &str,
        user_id: i64,
        category: &str,
        amount: Decimal,
    ) -> SpendOutcome {
        let body = json!({ "userId": user_id, "category": category, "amount": amount });
        match post_json::<SpendOutcome>(&self.http, &self.spend_url, token, &body).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(user_id, category, %err, "budget spend-apply unreachable");
                SpendOutcome::unavailable(format!(
                    "Budget service unavailable - fallback activated: {err}"
                ))
            }
        }
    }
}
