//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
    pub engine: EngineInfo,
}

/// Growth engine settings the server is running with
#[derive(Serialize)]
pub struct EngineInfo {
    pub variety_table_version: String,
    pub known_varieties: usize,
    pub default_harvest_days: u32,
    pub lockout_max_attempts: u32,
    pub lockout_seconds: i64,
}

/// Reports degraded with 503 when the database cannot be reached
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database_up = sqlx::query("SELECT 1").execute(&state.db).await.is_ok();
    if !database_up {
        tracing::warn!("Health check could not reach the database");
    }

    let status = if database_up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = HealthResponse {
        status: if database_up { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database: if database_up { "connected" } else { "disconnected" },
        engine: EngineInfo {
            variety_table_version: state.varieties.version.clone(),
            known_varieties: state.varieties.len(),
            default_harvest_days: state.varieties.default_harvest_days,
            lockout_max_attempts: state.config.lockout.max_attempts,
            lockout_seconds: state.config.lockout.lock_seconds,
        },
    };

    (status, Json(body))
}
