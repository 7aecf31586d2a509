pub mod cookie;
pub mod password;
pub mod session;

pub use cookie::{cleared_cookie, session_cookie, session_token, SESSION_COOKIE};
pub use session::{Claims, SessionService, TokenError};
