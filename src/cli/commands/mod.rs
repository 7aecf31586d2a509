pub mod partition;
pub mod user;
