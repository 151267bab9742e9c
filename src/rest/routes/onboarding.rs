// rest/routes/onboarding.rs — read-only wizard position.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::onboarding::step_for_profile;
use crate::rest::error::ApiError;
use crate::AppContext;

/// GET /api/v1/onboarding
///
/// The current wizard step, derived from the stored profile. The server never
/// persists wizard state of its own.
pub async fn current_step(
    State(ctx): State<Arc<AppContext>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Value>, ApiError> {
    let profile = ctx.storage.get_profile_for_user(&user_id).await?;
    let step = step_for_profile(profile.as_ref());
    Ok(Json(json!({
        "success": true,
        "data": { "step": step.as_str() },
    })))
}
