//! Budget endpoints

use crate::context::AppContext;
use crate::error::ApiError;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tally_advisor::BudgetCheck;
use tally_budget::{BudgetChanges, BudgetSummary, NewBudget};
use tally_core::{Amount, BudgetPeriod};
use tally_link::SpendOutcome;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBudgetRequest {
    pub user_id: i64,
    pub category: String,
    pub amount: Decimal,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBudgetRequest {
    pub user_id: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendRequest {
    pub user_id: i64,
    pub category: String,
    pub amount: Decimal,
}

/// GET /api/budgets/health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "UP", "service": "budget-service" }))
}

/// POST /api/budgets
pub async fn create(
    State(ctx): State<Arc<AppContext>>,
    Json(request): Json<CreateBudgetRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if request.category.trim().is_empty() {
        return Err(ApiError::BadRequest("Category is required".to_string()));
    }

    let period = request
        .period
        .as_deref()
        .map(BudgetPeriod::parse_lenient)
        .unwrap_or_default();

    let budget = ctx
        .ledger
        .create(NewBudget {
            user_id: request.user_id,
            category: request.category,
            limit: request.amount,
            period,
            start_date: request.start_date,
            description: request.description,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Budget created successfully",
            "budgetId": budget.id,
            "budget": budget,
        })),
    ))
}

/// GET /api/budgets?userId=
pub async fn list(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Value>, ApiError> {
    let budgets = ctx.ledger.budgets_for_user(query.user_id).await?;
    Ok(Json(json!(budgets)))
}

/// GET /api/budgets/active?userId=
pub async fn active(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Value>, ApiError> {
    let budgets = ctx.ledger.active_budgets(query.user_id).await?;
    Ok(Json(json!(budgets)))
}

/// GET /api/budgets/exceeded?userId=
pub async fn exceeded(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Value>, ApiError> {
    let budgets = ctx.ledger.exceeded_budgets(query.user_id).await?;
    Ok(Json(json!(budgets)))
}

/// GET /api/budgets/summary?userId=
pub async fn summary(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<UserQuery>,
) -> Result<Json<BudgetSummary>, ApiError> {
    Ok(Json(ctx.ledger.summarize(query.user_id).await?))
}

/// GET /api/budgets/category/{category}?userId=
pub async fn by_category(
    State(ctx): State<Arc<AppContext>>,
    Path(category): Path<String>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Value>, ApiError> {
    let budgets = ctx
        .ledger
        .budgets_for_category(query.user_id, &category)
        .await?;
    Ok(Json(json!(budgets)))
}

/// PUT /api/budgets/{id}
pub async fn update(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateBudgetRequest>,
) -> Result<Json<Value>, ApiError> {
    let changes = BudgetChanges {
        category: request.category,
        limit: request.amount,
        period: request.period.as_deref().map(BudgetPeriod::parse_lenient),
        description: request.description,
    };
    let budget = ctx.ledger.update(id, request.user_id, changes).await?;
    Ok(Json(json!({
        "message": "Budget updated successfully",
        "budget": budget,
    })))
}

/// DELETE /api/budgets/{id}?userId=
pub async fn remove(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Value>, ApiError> {
    ctx.ledger.delete(id, query.user_id).await?;
    Ok(Json(json!({ "message": "Budget deleted successfully" })))
}

/// POST /api/budgets/check-transaction
///
/// The pre-commit check used by the transaction service. Never mutates.
pub async fn check_transaction(
    State(ctx): State<Arc<AppContext>>,
    Json(request): Json<SpendRequest>,
) -> Result<Json<BudgetCheck>, ApiError> {
    let check = ctx
        .ledger
        .check_spend(request.user_id, &request.category, request.amount)
        .await?;
    Ok(Json(check))
}

/// POST /api/budgets/add-spending
///
/// The post-commit spend-apply used by the transaction service.
pub async fn add_spending(
    State(ctx): State<Arc<AppContext>>,
    Json(request): Json<SpendRequest>,
) -> Result<Json<SpendOutcome>, ApiError> {
    let amount = Amount::new(request.amount)
        .map_err(|_| ApiError::BadRequest("amount must not be negative".to_string()))?;
    let outcome = match ctx
        .ledger
        .apply_spend(request.user_id, &request.category, amount)
        .await?
    {
        Some(budget) => SpendOutcome::applied(&budget),
        None => SpendOutcome::no_budget(),
    };
    Ok(Json(outcome))
}
