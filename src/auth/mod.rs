//! Login, registration and logout.

mod models;

pub use models::{
    AuthResponse, LoginRequest, RegisterRequest, Registration, MIN_PASSWORD_LEN, MIN_USERNAME_LEN,
};

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::router::{Navigator, Route};
use crate::session::SessionState;

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REGISTER_PATH: &str = "/api/auth/register";

/// Talks to the authentication endpoints and keeps the session in step.
#[derive(Clone)]
pub struct AuthGateway {
    api: ApiClient,
    session: Arc<SessionState>,
    navigator: Arc<dyn Navigator>,
}

impl AuthGateway {
    pub fn new(api: ApiClient, session: Arc<SessionState>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            api,
            session,
            navigator,
        }
    }

    /// Exchange credentials for a session token.
    ///
    /// The session is only touched on success; any failure leaves both the
    /// store and the in-memory state as they were.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let response: AuthResponse = match self.api.post_json(LOGIN_PATH, request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Login failed for {}: {}", request.username, e.log_line());
                return Err(e);
            }
        };

        self.session
            .set_authenticated(&response.access_token, &response.username);
        info!("Logged in as {}", response.username);
        Ok(response)
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<Registration, ApiError> {
        match self.api.post(REGISTER_PATH, request).await {
            Ok(response) => {
                info!("Registered {}", request.username);
                Ok(Registration::from_body(&response.body))
            }
            Err(e) => {
                warn!("Registration failed for {}: {}", request.username, e.log_line());
                Err(e)
            }
        }
    }

    /// Drop the session and return to the login view. Purely local.
    pub fn logout(&self) -> Route {
        if let Some(username) = self.session.username() {
            info!("Logging out {}", username);
        }
        self.session.clear();
        self.navigator.navigate(Route::Login)
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }
}

/// User-facing text for a failed registration: the server's own message
/// when it sent plain text, otherwise the transport-level description.
pub fn registration_error_message(err: &ApiError) -> String {
    match err.body().map(|body| Registration::from_body(body.as_bytes())) {
        Some(Registration::Message(message)) if !message.trim().is_empty() => message,
        _ => err.to_string(),
    }
}
