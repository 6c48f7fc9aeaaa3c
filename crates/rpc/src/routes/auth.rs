//! Token validation endpoints

use crate::context::AppContext;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use tally_identity::TokenValidation;

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateUserRequest {
    pub token: String,
    pub user_id: i64,
}

/// POST /api/auth/validate
pub async fn validate(
    State(ctx): State<Arc<AppContext>>,
    Json(request): Json<ValidateRequest>,
) -> Json<TokenValidation> {
    Json(ctx.gate.validate(&request.token))
}

/// POST /api/auth/validate-user
pub async fn validate_user(
    State(ctx): State<Arc<AppContext>>,
    Json(request): Json<ValidateUserRequest>,
) -> Json<TokenValidation> {
    Json(ctx.gate.validate_for_subject(&request.token, request.user_id))
}
