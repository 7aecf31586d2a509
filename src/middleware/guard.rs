use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::session_token;

/// Outcome of the route guard for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(&'static str),
}

const PUBLIC_PATH: &str = "/";

/// Paths the guard never looks at. API routes answer 401 themselves.
fn is_excluded(path: &str) -> bool {
    const EXACT: [&str; 5] = ["/api", "/login", "/logout", "/health", "/favicon.ico"];
    const PREFIXES: [&str; 2] = ["/api/", "/static/"];

    EXACT.contains(&path) || PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

/// Presence-only check: a cookie is enough to pass. Whether it holds a
/// valid session is decided later by the page or API handler.
pub fn guard(path: &str, has_session_cookie: bool) -> GuardDecision {
    if path == PUBLIC_PATH || is_excluded(path) || has_session_cookie {
        GuardDecision::Allow
    } else {
        GuardDecision::Redirect(PUBLIC_PATH)
    }
}

pub async fn route_guard(jar: CookieJar, request: Request, next: Next) -> Response {
    match guard(request.uri().path(), session_token(&jar).is_some()) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::Redirect(to) => Redirect::to(to).into_response(),
    }
}
