// rest/routes/auth.rs — account registration and login.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::{hash_password, verify_password};
use crate::rest::error::ApiError;
use crate::validation::{validate_email, FieldError};
use crate::AppContext;

const PASSWORD_MIN: usize = 8;

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

fn validate_credentials(body: &CredentialsRequest) -> Result<(), ApiError> {
    let mut errors = validate_email("email", &body.email);
    if body.password.chars().count() < PASSWORD_MIN {
        errors.push(FieldError::new(
            "password",
            format!("must be at least {PASSWORD_MIN} characters"),
        ));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

/// POST /api/v1/auth/register
///
/// 201 with a fresh session token; duplicate email surfaces as 409 through
/// the store's structured conflict classification.
pub async fn register(
    State(ctx): State<Arc<AppContext>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(body) =
        payload.map_err(|_| ApiError::BadRequest("Request body is not valid JSON".to_string()))?;
    validate_credentials(&body)?;

    let password_hash = hash_password(&body.password)?;
    let user = ctx.storage.create_user(&body.email, &password_hash).await?;
    let session = ctx
        .storage
        .create_auth_session(&user.id, ctx.config.auth.session_ttl_hours)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": { "userId": user.id, "token": session.token },
            "message": "Account created successfully",
        })),
    ))
}

/// POST /api/v1/auth/login
///
/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(
    State(ctx): State<Arc<AppContext>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) =
        payload.map_err(|_| ApiError::BadRequest("Request body is not valid JSON".to_string()))?;

    let user = match ctx.storage.get_user_by_email(&body.email).await? {
        Some(user) if verify_password(&body.password, &user.password_hash) => user,
        _ => return Err(ApiError::Unauthorized),
    };

    let session = ctx
        .storage
        .create_auth_session(&user.id, ctx.config.auth.session_ttl_hours)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": { "userId": user.id, "token": session.token },
    })))
}
