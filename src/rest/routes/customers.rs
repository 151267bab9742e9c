// rest/routes/customers.rs — customers owned by the caller's profile.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::rest::error::ApiError;
use crate::storage::BusinessProfileRow;
use crate::validation::FieldError;
use crate::AppContext;

/// Every customer/review-request operation is scoped to the caller's
/// profile; callers who have not completed onboarding get the same 404 the
/// profile endpoint reports.
pub(super) async fn require_profile(
    ctx: &AppContext,
    user_id: &str,
) -> Result<BusinessProfileRow, ApiError> {
    ctx.storage
        .get_profile_for_user(user_id)
        .await?
        .ok_or(ApiError::NotFound("Business profile not found"))
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub phone: String,
    pub email: String,
}

pub async fn list_customers(
    State(ctx): State<Arc<AppContext>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Value>, ApiError> {
    let profile = require_profile(&ctx, &user_id).await?;
    let customers = ctx.storage.list_customers(&profile.id).await?;
    Ok(Json(json!({ "success": true, "data": customers })))
}

pub async fn create_customer(
    State(ctx): State<Arc<AppContext>>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<CreateCustomerRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(body) =
        payload.map_err(|_| ApiError::BadRequest("Request body is not valid JSON".to_string()))?;
    if body.name.trim().is_empty() {
        return Err(ApiError::Validation(vec![FieldError::new(
            "name",
            "is required",
        )]));
    }

    let profile = require_profile(&ctx, &user_id).await?;
    let customer = ctx
        .storage
        .create_customer(&profile.id, body.name.trim(), &body.phone, &body.email)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": customer })),
    ))
}
