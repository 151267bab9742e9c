// rest/routes/review_requests.rs — review request creation and lifecycle.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::rest::error::ApiError;
use crate::storage::{ReviewStatus, TransitionOutcome};
use crate::validation::FieldError;
use crate::AppContext;

use super::customers::require_profile;

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateReviewRequestRequest {
    pub customer_id: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub async fn list_review_requests(
    State(ctx): State<Arc<AppContext>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Value>, ApiError> {
    let profile = require_profile(&ctx, &user_id).await?;
    let requests = ctx.storage.list_review_requests(&profile.id).await?;
    Ok(Json(json!({ "success": true, "data": requests })))
}

/// POST /api/v1/review-requests
///
/// New requests start in `pending`. The customer must belong to the caller's
/// profile — another tenant's customer id is reported as not found, never as
/// a hint that it exists.
pub async fn create_review_request(
    State(ctx): State<Arc<AppContext>>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<CreateReviewRequestRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(body) =
        payload.map_err(|_| ApiError::BadRequest("Request body is not valid JSON".to_string()))?;
    if body.customer_id.is_empty() {
        return Err(ApiError::Validation(vec![FieldError::new(
            "customerId",
            "is required",
        )]));
    }

    let profile = require_profile(&ctx, &user_id).await?;
    if ctx
        .storage
        .get_customer(&body.customer_id, &profile.id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("Customer not found"));
    }

    let request = ctx
        .storage
        .create_review_request(&profile.id, &body.customer_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": request })),
    ))
}

/// POST /api/v1/review-requests/{id}/status
///
/// Applies one lifecycle transition. Illegal moves are a 400 naming the
/// current status; unknown or foreign ids are a 404.
pub async fn update_status(
    State(ctx): State<Arc<AppContext>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) =
        payload.map_err(|_| ApiError::BadRequest("Request body is not valid JSON".to_string()))?;
    let next: ReviewStatus = body
        .status
        .parse()
        .map_err(|_| ApiError::Validation(vec![FieldError::new("status", "is not a valid status")]))?;

    let profile = require_profile(&ctx, &user_id).await?;
    match ctx
        .storage
        .transition_review_request(&id, &profile.id, next)
        .await?
    {
        TransitionOutcome::Applied(request) => {
            Ok(Json(json!({ "success": true, "data": request })))
        }
        TransitionOutcome::InvalidState(current) => Err(ApiError::BadRequest(format!(
            "Cannot move review request from '{current}' to '{}'",
            next.as_str()
        ))),
        TransitionOutcome::NotFound => Err(ApiError::NotFound("Review request not found")),
    }
}
