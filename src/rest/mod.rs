// rest/mod.rs — Public REST API server.
//
// Axum HTTP server, local only unless bind_address is widened in config.
//
// Endpoints:
//   GET  /api/v1/health
//   POST /api/v1/auth/register
//   POST /api/v1/auth/login
//   GET  /api/v1/profile
//   POST /api/v1/profile
//   GET  /api/v1/onboarding
//   GET  /api/v1/customers
//   POST /api/v1/customers
//   GET  /api/v1/review-requests
//   POST /api/v1/review-requests
//   POST /api/v1/review-requests/{id}/status

pub mod error;
pub mod routes;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::AppContext;

pub async fn start_rest_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("REST API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        // Health (no auth)
        .route("/api/v1/health", get(routes::health::health))
        // Accounts
        .route("/api/v1/auth/register", post(routes::auth::register))
        .route("/api/v1/auth/login", post(routes::auth::login))
        // Business profile
        .route(
            "/api/v1/profile",
            get(routes::profile::get_profile).post(routes::profile::submit_profile),
        )
        .route("/api/v1/onboarding", get(routes::onboarding::current_step))
        // Customers
        .route(
            "/api/v1/customers",
            get(routes::customers::list_customers).post(routes::customers::create_customer),
        )
        // Review requests
        .route(
            "/api/v1/review-requests",
            get(routes::review_requests::list_review_requests)
                .post(routes::review_requests::create_review_request),
        )
        .route(
            "/api/v1/review-requests/{id}/status",
            post(routes::review_requests::update_status),
        )
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}
