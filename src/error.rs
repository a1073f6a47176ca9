//! Error types shared by the API client and the services built on it.

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single API call.
///
/// `Display` renders the same one-line message for every variant family so
/// callers can surface it to the user verbatim.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("Http failure response for {url}: 0 Unknown Error")]
    Transport { url: String, message: String },

    /// The server answered with a non-2xx status.
    #[error("Http failure response for {url}: {}", status_line(.status))]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    /// A 2xx response whose body was not the expected JSON.
    #[error("Http failure during parsing for {url}")]
    Decode { url: String, message: String },

    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for 401 and 403, the statuses that usually mean the session
    /// token was rejected.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        )
    }

    /// Raw response body, for status errors.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Underlying cause: the transport or decode message, or a non-empty
    /// response body. `Display` omits it.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Transport { message, .. } | Self::Decode { message, .. } => Some(message),
            Self::Status { body, .. } if !body.is_empty() => Some(body),
            _ => None,
        }
    }

    /// `Display` text followed by the underlying cause, for log lines.
    pub fn log_line(&self) -> String {
        match self.detail() {
            Some(detail) => format!("{} ({})", self, detail),
            None => self.to_string(),
        }
    }
}

fn status_line(status: &StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

/// Input rejected before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    EmptyField(&'static str),

    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("Please enter a valid URL.")]
    InvalidUrl,
}
