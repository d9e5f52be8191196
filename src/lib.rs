//! Stockledger API Library
//!
//! Inventory ledger backend: product CRUD, append-only purchase and sale
//! tracking with stock-sufficiency enforcement, a derived chronological
//! inventory ledger, and cookie-transported JWT authentication.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod services;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    routing::get,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::sync::Arc;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub auth: Arc<auth::AuthService>,
    pub services: handlers::AppServices,
}

/// Versioned API routes. Product, purchase, and sale endpoints require a
/// valid access token; the inventory ledger endpoint is open.
pub fn api_v1_routes() -> Router<AppState> {
    use auth::AuthRouterExt;

    Router::new()
        .nest(
            "/products",
            handlers::products::products_routes().with_auth(),
        )
        .nest(
            "/purchases",
            handlers::purchases::purchases_routes().with_auth(),
        )
        .nest("/sales", handlers::sales::sales_routes().with_auth())
        .nest("/inventory", handlers::inventory::inventory_routes())
}

async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Inject AuthService into request extensions for the auth middleware
async fn inject_auth_service(
    State(auth): State<Arc<auth::AuthService>>,
    mut request: Request,
    next: Next,
) -> Response {
    request.extensions_mut().insert(auth);
    next.run(request).await
}

/// Compose the full application router: status/health, versioned API, auth
/// routes, plus the cookie bridge and auth-service layers. Transport-level
/// layers (tracing, CORS, compression) are applied by the binary.
pub fn build_router(state: AppState) -> Router {
    let auth_service = state.auth.clone();

    Router::new()
        .route("/", get(|| async { "stockledger-api up" }))
        .route("/health", get(health_handler))
        .nest("/api/v1", api_v1_routes())
        .nest("/auth", auth::auth_routes())
        // Lift access/refresh cookies into the authorization context
        .layer(axum::middleware::from_fn(auth::cookie_auth_bridge))
        // Make AuthService available to the auth middleware
        .layer(axum::middleware::from_fn_with_state(
            auth_service,
            inject_auth_service,
        ))
        .with_state(state)
}
