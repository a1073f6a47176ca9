//! Session gate for protected views.

use std::sync::Arc;

use super::Route;
use crate::session::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Route),
}

/// Admits protected views only while a session exists.
///
/// The check is synchronous and reads the live flag each time; it never
/// asks the server whether the token is still valid.
#[derive(Debug, Clone)]
pub struct NavigationGuard {
    session: Arc<SessionState>,
}

impl NavigationGuard {
    pub fn new(session: Arc<SessionState>) -> Self {
        Self { session }
    }

    pub fn check(&self, route: Route) -> GuardDecision {
        if !route.is_protected() || self.session.is_authenticated() {
            GuardDecision::Allow
        } else {
            GuardDecision::Redirect(Route::Login)
        }
    }
}
