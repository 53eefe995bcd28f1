//! HTTP Server Assembly
//! Mission: Compose stores, token handling, and routes into one app

use crate::auth::{api as auth_api, verify_user, JwtHandler, UserStore};
use crate::contacts::{api as contacts_api, ContactStore};
use crate::middleware::logging::request_logging;
use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared application state, built once at startup and injected as
/// explicit dependencies; no ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub user_store: Arc<UserStore>,
    pub contact_store: Arc<ContactStore>,
    pub jwt_handler: Arc<JwtHandler>,
}

/// Create the API router, mounted under the fixed `/contactmyst` prefix.
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/contactmyst/register", post(auth_api::register))
        .route("/contactmyst/login", post(auth_api::login));

    let protected_routes = Router::new()
        .route("/contactmyst/auth", get(auth_api::get_current_user))
        .route("/contactmyst/update-profile", put(auth_api::update_profile))
        .route("/contactmyst/add-contacts", post(contacts_api::add_contact))
        .route("/contactmyst/contacts", get(contacts_api::list_contacts))
        .route(
            "/contactmyst/contacts/:id",
            get(contacts_api::get_contact).delete(contacts_api::delete_contact),
        )
        .route(
            "/contactmyst/update-contacts/:id",
            put(contacts_api::update_contact),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), verify_user));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ===== Route Handlers =====

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}
