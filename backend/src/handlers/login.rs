//! Login lockout HTTP handlers
//!
//! The sign-in itself is handled by the hosted auth provider; the dashboards
//! report outcomes here so lockout state survives across browsers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use shared::SystemClock;

use crate::services::LockoutService;
use crate::AppState;

fn lockout_service(state: &AppState) -> LockoutService<SystemClock> {
    LockoutService::new(state.db.clone(), state.config.lockout.policy(), SystemClock)
}

/// Current lockout decision for an identity
pub async fn get_login_status(
    State(state): State<AppState>,
    Path(identity): Path<String>,
) -> impl IntoResponse {
    match lockout_service(&state).status(&identity).await {
        Ok(decision) => (StatusCode::OK, Json(decision)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Gate a sign-in attempt: 200 when allowed, 429 while locked
pub async fn check_login_allowed(
    State(state): State<AppState>,
    Path(identity): Path<String>,
) -> impl IntoResponse {
    match lockout_service(&state).ensure_allowed(&identity).await {
        Ok(remaining) => (
            StatusCode::OK,
            Json(serde_json::json!({ "remaining_attempts": remaining })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a failed sign-in
pub async fn record_login_failure(
    State(state): State<AppState>,
    Path(identity): Path<String>,
) -> impl IntoResponse {
    match lockout_service(&state).record_failure(&identity).await {
        Ok(decision) => (StatusCode::OK, Json(decision)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Clear the counter after a successful sign-in
pub async fn reset_login_attempts(
    State(state): State<AppState>,
    Path(identity): Path<String>,
) -> impl IntoResponse {
    match lockout_service(&state).reset(&identity).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
