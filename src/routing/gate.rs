//! Session-cookie authorization gate.
//!
//! The login path is open to every method. Any other path needs a `Cookie`
//! header containing `auth=true` (a substring match, so
//! `theme=dark; auth=true` passes). The gate runs before route dispatch.

use crate::http::headers::HeaderMap;
use crate::http::request::Request;

pub const LOGIN_PATH: &str = "/login";

/// Cookie pair set on login and required afterwards.
pub const SESSION_COOKIE: &str = "auth=true";

/// Decides whether a request may reach its handler.
#[derive(Debug, Clone)]
pub struct AuthGate {
    login_path: String,
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::new(LOGIN_PATH)
    }
}

impl AuthGate {
    pub fn new(login_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
        }
    }

    pub fn is_login(&self, request: &Request) -> bool {
        request.path == self.login_path
    }

    pub fn admits(&self, request: &Request) -> bool {
        self.is_login(request) || has_session(&request.headers)
    }
}

/// True when the `Cookie` header carries the session pair.
pub fn has_session(headers: &HeaderMap) -> bool {
    headers
        .get("cookie")
        .is_some_and(|cookie| cookie.contains(SESSION_COOKIE))
}
