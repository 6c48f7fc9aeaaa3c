//! HTTP error mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tally_budget::BudgetError;
use tally_transaction::TransactionError;
use thiserror::Error;
use tracing::error;

/// API-level error with a canonical HTTP status.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<TransactionError> for ApiError {
    fn from(err: TransactionError) -> Self {
        let msg = err.to_string();
        match err {
            TransactionError::Unauthorized(_) => ApiError::Unauthorized(msg),
            TransactionError::Validation(_) => ApiError::BadRequest(msg),
            TransactionError::NotFound(_) => ApiError::NotFound(msg),
            TransactionError::Store(_) => ApiError::Internal(msg),
        }
    }
}

impl From<BudgetError> for ApiError {
    fn from(err: BudgetError) -> Self {
        let msg = err.to_string();
        match err {
            BudgetError::DuplicateActiveBudget { .. } => ApiError::Conflict(msg),
            BudgetError::NotFound(_) => ApiError::NotFound(msg),
            BudgetError::Forbidden { .. } => ApiError::Forbidden(msg),
            BudgetError::InvalidLimit(_) => ApiError::BadRequest(msg),
            BudgetError::Store(_) => ApiError::Internal(msg),
        }
    }
}
