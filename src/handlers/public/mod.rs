// handlers/public/mod.rs - Handlers reachable without a session
//
// The route guard never intercepts these paths, except `/`, which is the one
// public page and is always allowed through.

pub mod landing;
pub mod session;

pub use landing::{health, landing};
pub use session::{login, logout};
