use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::auth::password::verify_password;
use crate::auth::{SessionService, TokenError};
use crate::database::{CredentialStore, StoreError};
use crate::models::AuthenticatedUser;

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Email and password are required")]
    MissingFields,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Password verification failed: {0}")]
    Verification(String),
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: AuthenticatedUser,
    pub token: String,
}

/// Checks credentials against the global partition and issues sessions.
#[derive(Clone)]
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    sessions: Arc<SessionService>,
}

impl AuthService {
    pub fn new(credentials: Arc<dyn CredentialStore>, sessions: Arc<SessionService>) -> Self {
        Self { credentials, sessions }
    }

    pub async fn login(&self, email: Option<&str>, password: Option<&str>) -> Result<LoginOutcome, LoginError> {
        let email = email.map(str::trim).filter(|e| !e.is_empty());
        let password = password.filter(|p| !p.is_empty());
        let (Some(email), Some(password)) = (email, password) else {
            return Err(LoginError::MissingFields);
        };

        let Some(user) = self.credentials.find_user_by_email(email).await? else {
            warn!("Login failed: unknown email");
            return Err(LoginError::InvalidCredentials);
        };

        // Argon2 is deliberately slow; keep it off the async workers.
        let password = password.to_string();
        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| LoginError::Verification(e.to_string()))?
            .map_err(|e| LoginError::Verification(e.to_string()))?;

        if !matches {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(LoginError::InvalidCredentials);
        }

        let identity = user.identity();
        let token = self.sessions.issue(&identity)?;
        info!(user_id = %identity.id, "User signed in");
        Ok(LoginOutcome { user: identity, token })
    }
}
