//! Field and growth HTTP handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use shared::{Clock, FixedClock, SystemClock};

use crate::services::field::{CompleteTaskInput, CreateFieldInput, FieldService, ImportFieldInput};
use crate::services::GrowthService;
use crate::AppState;

/// Optional reference day for derived values
#[derive(Debug, Default, Deserialize)]
pub struct AsOfQuery {
    pub as_of: Option<NaiveDate>,
}

fn growth_service(state: &AppState, as_of: Option<NaiveDate>) -> GrowthService<Arc<dyn Clock>> {
    let clock: Arc<dyn Clock> = match as_of {
        Some(date) => Arc::new(FixedClock::at_date(date)),
        None => Arc::new(SystemClock),
    };
    GrowthService::new(state.db.clone(), state.varieties.clone(), clock)
}

/// List all fields
pub async fn list_fields(State(state): State<AppState>) -> impl IntoResponse {
    let service = FieldService::new(state.db.clone());

    match service.list_fields().await {
        Ok(fields) => (StatusCode::OK, Json(serde_json::json!({ "fields": fields }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a specific field
pub async fn get_field(
    State(state): State<AppState>,
    Path(field_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = FieldService::new(state.db.clone());

    match service.get_field(field_id).await {
        Ok(field) => (StatusCode::OK, Json(field)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a new field
pub async fn create_field(
    State(state): State<AppState>,
    Json(input): Json<CreateFieldInput>,
) -> impl IntoResponse {
    let service = growth_service(&state, None);

    match service.create_field(input).await {
        Ok(field) => (StatusCode::CREATED, Json(field)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a field from a document exported by the hosted store
pub async fn import_field(
    State(state): State<AppState>,
    Json(input): Json<ImportFieldInput>,
) -> impl IntoResponse {
    let service = growth_service(&state, None);

    match service.import_field(input).await {
        Ok(field) => (StatusCode::CREATED, Json(field)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Derived growth status for a field
pub async fn get_field_growth(
    State(state): State<AppState>,
    Path(field_id): Path<Uuid>,
    Query(query): Query<AsOfQuery>,
) -> impl IntoResponse {
    let service = growth_service(&state, query.as_of);

    match service.field_growth(field_id).await {
        Ok(growth) => (StatusCode::OK, Json(growth)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Recommended tasks for a field
pub async fn get_field_recommendations(
    State(state): State<AppState>,
    Path(field_id): Path<Uuid>,
    Query(query): Query<AsOfQuery>,
) -> impl IntoResponse {
    let service = growth_service(&state, query.as_of);

    match service.recommendations(field_id).await {
        Ok(recommendations) => (
            StatusCode::OK,
            Json(serde_json::json!({ "recommendations": recommendations })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Mark a task done on a field
pub async fn complete_task(
    State(state): State<AppState>,
    Path(field_id): Path<Uuid>,
    Json(input): Json<CompleteTaskInput>,
) -> impl IntoResponse {
    let service = growth_service(&state, None);

    match service.complete_task(field_id, input).await {
        Ok(growth) => (StatusCode::OK, Json(growth)).into_response(),
        Err(e) => e.into_response(),
    }
}
