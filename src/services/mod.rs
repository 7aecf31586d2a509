pub mod auth_service;
pub mod resource_service;

pub use auth_service::{AuthService, LoginError, LoginOutcome};
pub use resource_service::{ResourceService, ServiceError};
