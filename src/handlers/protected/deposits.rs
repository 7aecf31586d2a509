// handlers/protected/deposits.rs - /api/deposits[/:id], /api/deposits/summary

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{create_record, delete_record, update_record};
use crate::analytics::{deposit_metrics, deposit_summary, DepositMetrics, DepositSummary};
use crate::error::ApiError;
use crate::middleware::ApiUser;
use crate::models::{Deposit, DepositFilter, Stored};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DepositQuery {
    #[serde(rename = "isActive")]
    pub is_active: Option<String>,
}

impl From<DepositQuery> for DepositFilter {
    fn from(query: DepositQuery) -> Self {
        DepositFilter::from_query(query.is_active.as_deref())
    }
}

#[derive(Debug, Serialize)]
pub struct DepositRow {
    #[serde(flatten)]
    pub deposit: Stored<Deposit>,
    #[serde(flatten)]
    pub metrics: DepositMetrics,
}

/// GET /api/deposits?isActive=true|false
pub async fn list(
    State(state): State<AppState>,
    caller: ApiUser,
    Query(query): Query<DepositQuery>,
) -> Result<Json<Vec<DepositRow>>, ApiError> {
    let deposits = state.deposits.list(&caller.partition, &query.into()).await?;
    let today = Utc::now().date_naive();
    let rows = deposits
        .into_iter()
        .map(|deposit| DepositRow {
            metrics: deposit_metrics(&deposit.record, today),
            deposit,
        })
        .collect();
    Ok(Json(rows))
}

/// GET /api/deposits/summary?isActive=true|false
pub async fn summary(
    State(state): State<AppState>,
    caller: ApiUser,
    Query(query): Query<DepositQuery>,
) -> Result<Json<DepositSummary>, ApiError> {
    let deposits = state.deposits.list(&caller.partition, &query.into()).await?;
    Ok(Json(deposit_summary(deposits.iter().map(|d| &d.record))))
}

/// POST /api/deposits
pub async fn create(
    State(state): State<AppState>,
    caller: ApiUser,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Stored<Deposit>>), ApiError> {
    create_record(&state.deposits, &caller.partition, body).await
}

/// PUT /api/deposits/:id
pub async fn update(
    State(state): State<AppState>,
    caller: ApiUser,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    update_record(&state.deposits, &caller.partition, &id, body).await
}

/// DELETE /api/deposits/:id
pub async fn delete(
    State(state): State<AppState>,
    caller: ApiUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    delete_record(&state.deposits, &caller.partition, &id).await
}
