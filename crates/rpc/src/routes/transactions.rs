//! Transaction endpoints

use crate::context::AppContext;
use crate::error::ApiError;
use crate::routes::bearer_token;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;
use tally_transaction::{TransactionReceipt, TransactionRequest};

/// GET /api/transactions/health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "UP", "service": "transaction-service" }))
}

/// POST /api/transactions
pub async fn create(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Json(request): Json<TransactionRequest>,
) -> Result<(StatusCode, Json<TransactionReceipt>), ApiError> {
    let token = bearer_token(&headers)?;
    let receipt = ctx.coordinator.record(request, &token).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// GET /api/transactions/user/{user_id}
pub async fn by_user(
    State(ctx): State<Arc<AppContext>>,
    Path(user_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let token = bearer_token(&headers)?;
    let transactions = ctx.coordinator.transactions_for_user(user_id, &token).await?;
    Ok(Json(json!(transactions)))
}

/// GET /api/transactions/user/{user_id}/category/{category}
pub async fn by_category(
    State(ctx): State<Arc<AppContext>>,
    Path((user_id, category)): Path<(i64, String)>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let token = bearer_token(&headers)?;
    let transactions = ctx
        .coordinator
        .transactions_for_category(user_id, &category, &token)
        .await?;
    Ok(Json(json!(transactions)))
}

/// GET /api/transactions/user/{user_id}/balance
pub async fn balance(
    State(ctx): State<Arc<AppContext>>,
    Path(user_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let token = bearer_token(&headers)?;
    let balance = ctx.coordinator.balance_for_user(user_id, &token).await?;
    Ok(Json(json!({ "userId": user_id, "balance": balance })))
}

/// GET /api/transactions/user/{user_id}/summary
pub async fn summary(
    State(ctx): State<Arc<AppContext>>,
    Path(user_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let token = bearer_token(&headers)?;
    let transactions = ctx.coordinator.transactions_for_user(user_id, &token).await?;
    let summary = ctx.coordinator.category_summary(user_id, &token).await?;
    let balance = ctx.coordinator.balance_for_user(user_id, &token).await?;
    Ok(Json(json!({
        "userId": user_id,
        "totalTransactions": transactions.len(),
        "categorySummary": summary,
        "balance": balance,
    })))
}

/// GET /api/transactions/{id}
pub async fn by_id(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let token = bearer_token(&headers)?;
    let transaction = ctx.coordinator.transaction_by_id(id, &token).await?;
    Ok(Json(json!(transaction)))
}
