// handlers/public/landing.rs - GET / and GET /health

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use tracing::error;

use crate::auth::session_token;
use crate::state::AppState;

/// GET / - service description, or a redirect to the dashboard when the
/// visitor already holds a valid session.
pub async fn landing(State(state): State<AppState>, jar: CookieJar) -> Response {
    let signed_in = session_token(&jar)
        .and_then(|token| state.sessions.verify(token))
        .is_some();
    if signed_in {
        return Redirect::to("/dashboard").into_response();
    }

    Json(json!({
        "name": "Finance Tracker API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "session": "POST /login, POST /logout (public)",
            "dashboard": "/dashboard (signed in)",
            "companies": "/api/companies[/:id] (signed in)",
            "portfolio": "/api/portfolio[/:id], /api/portfolio/summary (signed in)",
            "deposits": "/api/deposits[/:id], /api/deposits/summary (signed in)",
            "health": "/health (public)",
        }
    }))
    .into_response()
}

/// GET /health - store liveness
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.credentials.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => {
            error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": { "status": "degraded", "timestamp": now }
                })),
            )
        }
    }
}
