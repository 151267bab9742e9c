//! Session resolution and password hashing.
//!
//! The session resolver is an axum extractor: `AuthUser` maps the
//! `Authorization: Bearer <token>` header to the owning user id and threads
//! it into handlers as an explicit value. A missing or malformed header is
//! rejected before any store access.

use anyhow::{anyhow, Result};
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use std::sync::Arc;

use crate::rest::error::ApiError;
use crate::AppContext;

/// Hash a password with Argon2id and a per-password random salt.
/// The PHC-format string embeds algorithm, salt, and parameters.
pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| anyhow!("password hashing failed: {e}"))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC-format hash.
/// An unparseable hash verifies as false rather than erroring.
pub fn verify_password(plain: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Extract the bearer token from an `Authorization` header value.
/// Returns `None` unless the value is exactly `Bearer <non-empty token>`.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
}

/// The authenticated caller's user id, resolved from the bearer session.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

impl FromRequestParts<Arc<AppContext>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &Arc<AppContext>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or(ApiError::Unauthorized)?;

        match ctx.storage.resolve_token(token).await? {
            Some(user_id) => Ok(AuthUser(user_id)),
            None => Err(ApiError::Unauthorized),
        }
    }
}
