use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{AppConfig, ConfigError};
use crate::models::AuthenticatedUser;

/// Payload signed into every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user: &AuthenticatedUser, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            user_id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.user_id,
            email: claims.email,
            name: claims.name,
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("JWT generation error: {0}")]
    Generation(#[from] jsonwebtoken::errors::Error),
}

/// Issues and verifies HS256 session tokens.
///
/// Verification is stateless: there is no server-side session table, so a
/// token stays usable until `exp` even after the cookie holding it is
/// cleared.
#[derive(Debug, Clone)]
pub struct SessionService {
    secret: Option<String>,
    ttl: Duration,
}

impl SessionService {
    pub fn new(secret: Option<String>, ttl: Duration) -> Self {
        Self { secret, ttl }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.jwt_secret().ok().map(str::to_owned),
            Duration::days(config.security.session_ttl_days),
        )
    }

    fn secret(&self) -> Result<&str, ConfigError> {
        self.secret
            .as_deref()
            .ok_or(ConfigError::Missing("JWT_SECRET"))
    }

    pub fn issue(&self, user: &AuthenticatedUser) -> Result<String, TokenError> {
        self.issue_at(user, Utc::now())
    }

    pub fn issue_at(&self, user: &AuthenticatedUser, now: DateTime<Utc>) -> Result<String, TokenError> {
        let secret = self.secret()?;
        let claims = Claims::new(user, now, self.ttl);
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?;
        Ok(token)
    }

    /// Identity embedded in `token`, or `None` when it is malformed, signed
    /// with another key, expired, or no secret is configured.
    pub fn verify(&self, token: &str) -> Option<AuthenticatedUser> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Option<AuthenticatedUser> {
        let secret = self.secret().ok()?;

        // Expiry is checked against `now` below so the cutoff is exact and testable.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation).ok()?;
        if now.timestamp() > data.claims.exp {
            return None;
        }
        Some(data.claims.into())
    }
}
