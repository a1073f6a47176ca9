//! In-memory session state mirrored to a credential store.
//!
//! The token, username and authenticated flag are held in three observable
//! cells. Every transition writes the store first, swaps all three cells,
//! and only then notifies subscribers, so no subscriber ever sees a token
//! without its matching flag.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::credentials::{Credential, CredentialStore, TOKEN_KEY, USERNAME_KEY};
use crate::reactive::{Observable, Subject};

/// Consistent view of the session at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub token: Option<String>,
    pub username: Option<String>,
    pub authenticated: bool,
}

/// Shared, observable authentication state.
pub struct SessionState {
    store: Arc<dyn CredentialStore>,
    token: Subject<Option<String>>,
    username: Subject<Option<String>>,
    authenticated: Subject<bool>,
    writer: Mutex<()>,
}

impl SessionState {
    /// Seed the session from whatever the store already holds.
    ///
    /// A stored token counts as authenticated even if it has since expired;
    /// the server decides that on the next request.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        let Credential { token, username } = Credential::load(store.as_ref());
        let authenticated = token.is_some();
        if authenticated {
            debug!("Restored session for {:?}", username);
        }

        Self {
            store,
            token: Subject::new(token),
            username: Subject::new(username),
            authenticated: Subject::new(authenticated),
            writer: Mutex::new(()),
        }
    }

    /// Record a successful login.
    pub fn set_authenticated(&self, token: &str, username: &str) {
        {
            let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
            self.store
                .set_many(&[(TOKEN_KEY, token), (USERNAME_KEY, username)]);
            self.token.replace(Some(token.to_string()));
            self.username.replace(Some(username.to_string()));
            self.authenticated.replace(true);
        }
        self.publish();
    }

    /// Forget the current session, in the store and in memory.
    pub fn clear(&self) {
        {
            let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
            self.store.remove_many(&[TOKEN_KEY, USERNAME_KEY]);
            self.token.replace(None);
            self.username.replace(None);
            self.authenticated.replace(false);
        }
        self.publish();
    }

    pub fn token(&self) -> Option<String> {
        self.token.get()
    }

    pub fn username(&self) -> Option<String> {
        self.username.get()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated.get()
    }

    /// Read all three values without interleaving a concurrent transition.
    pub fn snapshot(&self) -> SessionSnapshot {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        SessionSnapshot {
            token: self.token.get(),
            username: self.username.get(),
            authenticated: self.authenticated.get(),
        }
    }

    pub fn token_changes(&self) -> Observable<Option<String>> {
        self.token.observable()
    }

    pub fn username_changes(&self) -> Observable<Option<String>> {
        self.username.observable()
    }

    pub fn authenticated_changes(&self) -> Observable<bool> {
        self.authenticated.observable()
    }

    fn publish(&self) {
        self.token.publish();
        self.username.publish();
        self.authenticated.publish();
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState")
            .field("username", &self.username())
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
