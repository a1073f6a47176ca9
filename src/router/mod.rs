//! Views and navigation between them.

mod guard;

pub use guard::{GuardDecision, NavigationGuard};

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, info};

use crate::reactive::{Observable, Subject};

/// A navigable view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "login",
            Route::Register => "register",
            Route::Dashboard => "dashboard",
        }
    }

    /// Map a path to a view. The empty path and unknown paths land on the
    /// dashboard.
    pub fn resolve(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        match path.trim_matches('/') {
            "login" => Route::Login,
            "register" => Route::Register,
            _ => Route::Dashboard,
        }
    }

    /// Whether entering this view requires a session.
    pub fn is_protected(self) -> bool {
        matches!(self, Route::Dashboard)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.path())
    }
}

/// Something that can move the user to another view.
pub trait Navigator: Send + Sync {
    /// Navigate to `route` and return the view actually entered, which may
    /// differ when a guard redirects.
    fn navigate(&self, route: Route) -> Route;
}

/// Guarded navigator that tracks the current view.
pub struct Router {
    guard: NavigationGuard,
    current: Subject<Option<Route>>,
    navigations: AtomicUsize,
}

impl Router {
    pub fn new(guard: NavigationGuard) -> Self {
        Self {
            guard,
            current: Subject::new(None),
            navigations: AtomicUsize::new(0),
        }
    }

    /// Resolve `path` and navigate to it.
    pub fn navigate_to(&self, path: &str) -> Route {
        self.navigate(Route::resolve(path))
    }

    /// The view last entered, or `None` before the first navigation.
    pub fn current(&self) -> Option<Route> {
        self.current.get()
    }

    pub fn changes(&self) -> Observable<Option<Route>> {
        self.current.observable()
    }

    pub fn navigation_count(&self) -> usize {
        self.navigations.load(Ordering::SeqCst)
    }
}

impl Navigator for Router {
    fn navigate(&self, route: Route) -> Route {
        let landed = match self.guard.check(route) {
            GuardDecision::Allow => route,
            GuardDecision::Redirect(target) => {
                info!("Navigation to {} requires a session, redirecting to {}", route, target);
                target
            }
        };
        self.navigations.fetch_add(1, Ordering::SeqCst);
        debug!("Entered {}", landed);
        self.current.set(Some(landed));
        landed
    }
}
