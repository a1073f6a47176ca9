//! compann - company website analyzer client.
//!
//! Authenticates against the analyzer API, keeps a durable per-origin
//! session, and drives the extract-then-analyze workflow.

pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod dashboard;
pub mod error;
pub mod http;
pub mod reactive;
pub mod router;
pub mod session;

pub use app::App;
pub use error::{ApiError, ValidationError};
