//! Variety table handlers

use axum::{extract::State, Json};

use shared::VarietyTable;

use crate::AppState;

/// The variety table in use, including configured overrides
pub async fn list_varieties(State(state): State<AppState>) -> Json<VarietyTable> {
    Json(state.varieties.as_ref().clone())
}
