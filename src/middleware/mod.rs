pub mod auth;
pub mod guard;

pub use auth::{require_auth, ApiUser, AuthContext, AuthRejection, PageUser};
pub use guard::{guard, route_guard, GuardDecision};
