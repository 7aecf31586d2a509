// handlers/protected/companies.rs - /api/companies[/:id]

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use super::{create_record, delete_record, update_record};
use crate::error::ApiError;
use crate::middleware::ApiUser;
use crate::models::{Company, Stored};
use crate::state::AppState;

/// GET /api/companies - every company, ordered by instrument
pub async fn list(State(state): State<AppState>, caller: ApiUser) -> Result<Json<Vec<Stored<Company>>>, ApiError> {
    let companies = state.companies.list(&caller.partition, &()).await?;
    Ok(Json(companies))
}

/// POST /api/companies
pub async fn create(
    State(state): State<AppState>,
    caller: ApiUser,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Stored<Company>>), ApiError> {
    create_record(&state.companies, &caller.partition, body).await
}

/// PUT /api/companies/:id
pub async fn update(
    State(state): State<AppState>,
    caller: ApiUser,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    update_record(&state.companies, &caller.partition, &id, body).await
}

/// DELETE /api/companies/:id
pub async fn delete(
    State(state): State<AppState>,
    caller: ApiUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    delete_record(&state.companies, &caller.partition, &id).await
}
