use serde::{Deserialize, Serialize};

/// Row of the global `users` table. The hash never leaves the credential
/// store and the login service.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

impl UserRecord {
    pub fn identity(&self) -> AuthenticatedUser {
        AuthenticatedUser {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

/// Identity carried in a verified session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: String,
    pub name: String,
}
