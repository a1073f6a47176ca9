//! Bearer-token attachment for outgoing requests.

use std::sync::Arc;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::Request;
use tracing::warn;
use url::Url;

use crate::session::SessionState;

/// Path fragment shared by the login and register endpoints.
const AUTH_PATH: &str = "/api/auth/";

/// Adds `Authorization: Bearer <token>` to requests when a session exists.
///
/// The token is read at dispatch time, never cached. Authentication
/// endpoints are always sent without credentials.
#[derive(Debug, Clone)]
pub struct RequestAuthorizer {
    session: Arc<SessionState>,
}

impl RequestAuthorizer {
    pub fn new(session: Arc<SessionState>) -> Self {
        Self { session }
    }

    /// Returns whether a token was attached.
    pub fn authorize(&self, request: &mut Request) -> bool {
        if is_auth_endpoint(request.url()) {
            return false;
        }
        let Some(token) = self.session.token() else {
            return false;
        };

        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers_mut().insert(AUTHORIZATION, value);
                true
            }
            Err(_) => {
                warn!("Stored session token is not a valid header value; sending request without it");
                false
            }
        }
    }
}

/// Whether `url` targets the login/register endpoints.
pub fn is_auth_endpoint(url: &Url) -> bool {
    url.path().contains(AUTH_PATH)
}
