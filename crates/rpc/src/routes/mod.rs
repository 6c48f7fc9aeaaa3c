//! Route table

pub mod auth;
pub mod budgets;
pub mod transactions;

use crate::context::AppContext;
use crate::error::ApiError;
use axum::http::HeaderMap;
use axum::routing::{get, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Build the full application router.
pub fn router(ctx: Arc<AppContext>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // auth
        .route("/api/auth/validate", post(auth::validate))
        .route("/api/auth/validate-user", post(auth::validate_user))
        // budgets
        .route("/api/budgets/health", get(budgets::health))
        .route("/api/budgets", post(budgets::create).get(budgets::list))
        .route("/api/budgets/active", get(budgets::active))
        .route("/api/budgets/exceeded", get(budgets::exceeded))
        .route("/api/budgets/summary", get(budgets::summary))
        .route("/api/budgets/category/{category}", get(budgets::by_category))
        .route("/api/budgets/check-transaction", post(budgets::check_transaction))
        .route("/api/budgets/add-spending", post(budgets::add_spending))
        .route("/api/budgets/{id}", put(budgets::update).delete(budgets::remove))
        // transactions
        .route("/api/transactions/health", get(transactions::health))
        .route("/api/transactions", post(transactions::create))
        .route("/api/transactions/user/{user_id}", get(transactions::by_user))
        .route(
            "/api/transactions/user/{user_id}/category/{category}",
            get(transactions::by_category),
        )
        .route(
            "/api/transactions/user/{user_id}/balance",
            get(transactions::balance),
        )
        .route(
            "/api/transactions/user/{user_id}/summary",
            get(transactions::summary),
        )
        .route("/api/transactions/{id}", get(transactions::by_id))
        .with_state(ctx)
        .layer(cors)
}

/// Pull the bearer credential out of the Authorization header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;
    header
        .strip_prefix("Bearer ")
        .map(str::to_string)
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header format".to_string()))
}
