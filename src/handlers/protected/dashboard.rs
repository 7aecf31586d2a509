// handlers/protected/dashboard.rs - GET /dashboard

use axum::Json;
use serde_json::{json, Value};

use crate::middleware::PageUser;

/// Page-context entry point: unauthenticated visitors are redirected to `/`
/// by the extractor.
pub async fn dashboard(PageUser(user): PageUser) -> Json<Value> {
    Json(json!({ "user": user }))
}
