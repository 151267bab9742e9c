//! REST error taxonomy and its JSON rendering.
//!
//! Every failure renders as `{ "success": false, "error": <message> }`, with
//! validation failures carrying an extra `details` list of per-field
//! messages. Internal errors are logged server-side and return a generic
//! body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::storage::StoreError;
use crate::validation::FieldError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict => {
                ApiError::Conflict("A record with this unique value already exists".to_string())
            }
            StoreError::ForeignKey => {
                ApiError::BadRequest("Referenced record does not exist".to_string())
            }
            other => ApiError::Internal(other.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if let ApiError::Internal(e) = &self {
            error!(err = %e, "request failed unexpectedly");
        }

        let mut body = json!({ "success": false, "error": self.to_string() });
        if let ApiError::Validation(errors) = &self {
            let details: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            body["details"] = json!(details);
        }
        (status, Json(body)).into_response()
    }
}
