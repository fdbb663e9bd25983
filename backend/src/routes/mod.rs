//! Route definitions for the CaneMap server

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/varieties", get(handlers::list_varieties))
        .nest("/fields", field_routes())
        .nest("/login-attempts", login_routes())
}

/// Field and growth routes
fn field_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_fields).post(handlers::create_field))
        .route("/import", post(handlers::import_field))
        .route("/:field_id", get(handlers::get_field))
        .route("/:field_id/growth", get(handlers::get_field_growth))
        .route(
            "/:field_id/recommendations",
            get(handlers::get_field_recommendations),
        )
        .route("/:field_id/tasks", post(handlers::complete_task))
}

/// Login lockout routes
fn login_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/:identity",
            get(handlers::get_login_status).delete(handlers::reset_login_attempts),
        )
        .route("/:identity/check", post(handlers::check_login_allowed))
        .route("/:identity/failures", post(handlers::record_login_failure))
}
