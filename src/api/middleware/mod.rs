//! API middleware.

mod auth;
mod rate_limit;

pub use auth::{
    expired_session_cookie, login_redirect_path, require_session, session_claims,
    session_cookie, CurrentUser,
};
pub use rate_limit::rate_limit_login;
