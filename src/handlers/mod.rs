// handlers/mod.rs - HTTP handlers grouped by security level
//
// public/    no session required (login, logout, landing, health)
// protected/ session verified inside the handler via the auth extractors

pub mod protected;
pub mod public;

use serde_json::{json, Value};

/// Body returned by mutations that have nothing else to report.
pub(crate) fn success() -> Value {
    json!({ "success": true })
}
