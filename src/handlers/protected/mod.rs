// handlers/protected/mod.rs - Handlers that require a verified session
//
// Every handler here takes `ApiUser` (401 JSON on failure) or `PageUser`
// (redirect to `/` on failure). Records are read and written only in the
// partition derived from the caller's own identity.

pub mod companies;
pub mod dashboard;
pub mod deposits;
pub mod portfolio;

use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};
use serde_json::Value;
use tracing::info;

use crate::database::Partition;
use crate::error::ApiError;
use crate::handlers::success;
use crate::models::{Resource, Stored};
use crate::services::ResourceService;

pub use dashboard::dashboard;

pub(crate) async fn create_record<R: Resource>(
    service: &ResourceService<R>,
    partition: &Partition,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Stored<R>>), ApiError> {
    let Json(payload) = body?;
    let created = service.create(partition, &payload).await?;
    info!(partition = %partition, id = %created.id, "Created {}", R::SINGULAR);
    Ok((StatusCode::CREATED, Json(created)))
}

pub(crate) async fn update_record<R: Resource>(
    service: &ResourceService<R>,
    partition: &Partition,
    id: &str,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(payload) = body?;
    let updated = service.update(partition, id, &payload).await?;
    info!(partition = %partition, id = %updated.id, "Updated {}", R::SINGULAR);
    Ok(Json(success()))
}

pub(crate) async fn delete_record<R: Resource>(
    service: &ResourceService<R>,
    partition: &Partition,
    id: &str,
) -> Result<Json<Value>, ApiError> {
    service.delete(partition, id).await?;
    info!(partition = %partition, id, "Deleted {}", R::SINGULAR);
    Ok(Json(success()))
}
