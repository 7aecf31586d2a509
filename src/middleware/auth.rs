use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use crate::auth::{session_token, SessionService};
use crate::database::Partition;
use crate::error::ApiError;
use crate::models::AuthenticatedUser;
use crate::state::AppState;

/// Where an authentication check happens, which decides how failure looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthContext {
    /// Browser navigation: send the visitor to the landing page.
    Page,
    /// JSON API: answer 401 with an error body.
    Api,
}

#[derive(Debug)]
pub enum AuthRejection {
    RedirectToLanding,
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::RedirectToLanding => Redirect::to("/").into_response(),
            AuthRejection::Unauthorized => ApiError::unauthorized("Authentication required").into_response(),
        }
    }
}

/// Resolves the signed-in user from the session cookie.
pub fn require_auth(
    sessions: &SessionService,
    jar: &CookieJar,
    context: AuthContext,
) -> Result<AuthenticatedUser, AuthRejection> {
    let user = session_token(jar).and_then(|token| sessions.verify(token));
    user.ok_or(match context {
        AuthContext::Page => AuthRejection::RedirectToLanding,
        AuthContext::Api => AuthRejection::Unauthorized,
    })
}

/// API caller with a verified session and the partition that holds their
/// records.
#[derive(Debug, Clone)]
pub struct ApiUser {
    pub user: AuthenticatedUser,
    pub partition: Partition,
}

#[async_trait]
impl FromRequestParts<AppState> for ApiUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let user = require_auth(&state.sessions, &jar, AuthContext::Api)?;
        let partition = Partition::for_user(&user).map_err(|_| {
            warn!(user_id = %user.id, "Session identity does not map to a partition");
            AuthRejection::Unauthorized
        })?;
        Ok(ApiUser { user, partition })
    }
}

/// Page visitor with a verified session.
#[derive(Debug, Clone)]
pub struct PageUser(pub AuthenticatedUser);

#[async_trait]
impl FromRequestParts<AppState> for PageUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        require_auth(&state.sessions, &jar, AuthContext::Page).map(PageUser)
    }
}
