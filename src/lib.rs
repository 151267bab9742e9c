pub mod auth;
pub mod config;
pub mod onboarding;
pub mod rest;
pub mod storage;
pub mod validation;

use std::sync::Arc;

use config::ServerConfig;
use storage::Storage;

/// Shared application state passed to every REST handler.
///
/// Handlers receive the resolved caller identity as an explicit extractor
/// value (`auth::AuthUser`) — there is no ambient/global session state.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub storage: Arc<Storage>,
    pub started_at: std::time::Instant,
}
