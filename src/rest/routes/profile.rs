// rest/routes/profile.rs — business profile read + upsert.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::rest::error::ApiError;
use crate::validation::ProfileForm;
use crate::AppContext;

/// GET /api/v1/profile
///
/// Absence of a profile is a distinct 404 — clients use it to redirect into
/// the onboarding wizard.
pub async fn get_profile(
    State(ctx): State<Arc<AppContext>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Value>, ApiError> {
    match ctx.storage.get_profile_for_user(&user_id).await? {
        Some(profile) => Ok(Json(json!({ "success": true, "data": profile }))),
        None => Err(ApiError::NotFound("Business profile not found")),
    }
}

/// POST /api/v1/profile
///
/// Validates the body, then performs one atomic insert-or-overwrite keyed on
/// the caller's user id. 201 when a row was created, 200 when overwritten.
pub async fn submit_profile(
    State(ctx): State<Arc<AppContext>>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<ProfileForm>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(form) =
        payload.map_err(|_| ApiError::BadRequest("Request body is not valid JSON".to_string()))?;
    form.validate().map_err(ApiError::Validation)?;

    let (profile, created) = ctx.storage.upsert_profile(&user_id, &form).await?;
    let (status, message) = if created {
        (StatusCode::CREATED, "Business profile created successfully")
    } else {
        (StatusCode::OK, "Business profile updated successfully")
    };
    Ok((
        status,
        Json(json!({ "success": true, "data": profile, "message": message })),
    ))
}
