// handlers/protected/portfolio.rs - /api/portfolio[/:id], /api/portfolio/summary

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{create_record, delete_record, update_record};
use crate::analytics::{portfolio_summary, position_metrics, PortfolioSummary, PositionMetrics};
use crate::error::ApiError;
use crate::middleware::ApiUser;
use crate::models::{PortfolioEntry, PortfolioFilter, Stored};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PortfolioQuery {
    pub date: Option<String>,
}

impl From<PortfolioQuery> for PortfolioFilter {
    fn from(query: PortfolioQuery) -> Self {
        PortfolioFilter::on(query.date.as_deref())
    }
}

/// A stored entry with its position metrics alongside.
#[derive(Debug, Serialize)]
pub struct PortfolioRow {
    #[serde(flatten)]
    pub entry: Stored<PortfolioEntry>,
    #[serde(flatten)]
    pub metrics: PositionMetrics,
}

/// GET /api/portfolio?date=YYYY-MM-DD
pub async fn list(
    State(state): State<AppState>,
    caller: ApiUser,
    Query(query): Query<PortfolioQuery>,
) -> Result<Json<Vec<PortfolioRow>>, ApiError> {
    let entries = state.portfolio.list(&caller.partition, &query.into()).await?;
    let rows = entries
        .into_iter()
        .map(|entry| PortfolioRow {
            metrics: position_metrics(&entry.record),
            entry,
        })
        .collect();
    Ok(Json(rows))
}

/// GET /api/portfolio/summary?date=YYYY-MM-DD - totals over the same
/// selection `list` returns
pub async fn summary(
    State(state): State<AppState>,
    caller: ApiUser,
    Query(query): Query<PortfolioQuery>,
) -> Result<Json<PortfolioSummary>, ApiError> {
    let entries = state.portfolio.list(&caller.partition, &query.into()).await?;
    Ok(Json(portfolio_summary(entries.iter().map(|e| &e.record))))
}

/// POST /api/portfolio
pub async fn create(
    State(state): State<AppState>,
    caller: ApiUser,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Stored<PortfolioEntry>>), ApiError> {
    create_record(&state.portfolio, &caller.partition, body).await
}

/// PUT /api/portfolio/:id
pub async fn update(
    State(state): State<AppState>,
    caller: ApiUser,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    update_record(&state.portfolio, &caller.partition, &id, body).await
}

/// DELETE /api/portfolio/:id
pub async fn delete(
    State(state): State<AppState>,
    caller: ApiUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    delete_record(&state.portfolio, &caller.partition, &id).await
}
