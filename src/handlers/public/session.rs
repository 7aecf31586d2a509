// handlers/public/session.rs - POST /login and POST /logout

use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::info;

use crate::auth::{cleared_cookie, session_cookie};
use crate::error::ApiError;
use crate::handlers::success;
use crate::state::AppState;

/// Both fields are optional at the type level so that a missing one is
/// reported as 400 "Email and password are required" rather than as a
/// deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /login - verify credentials and set the `auth-token` cookie
///
/// Request: `{"email": "...", "password": "..."}`
/// Response: `{"success": true}` plus `Set-Cookie`.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body?;
    let outcome = state
        .auth
        .login(request.email.as_deref(), request.password.as_deref())
        .await?;

    let jar = jar.add(session_cookie(outcome.token, state.config.security.secure_cookies));
    Ok((jar, Json(success())))
}

/// POST /logout - drop the session cookie. Always succeeds; the token itself
/// stays valid until it expires.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    info!("Session cookie cleared");
    let jar = jar.add(cleared_cookie(state.config.security.secure_cookies));
    (jar, Json(success()))
}
