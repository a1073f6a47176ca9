//! Durable key/value slots for the session token and display name.
//!
//! Stores never report failures to callers: an unavailable backing store is
//! logged and otherwise treated as empty.

mod file;
mod memory;

pub use file::{origin_slug, FileCredentialStore};
pub use memory::MemoryCredentialStore;

/// Storage key for the session token. Its absence means "logged out".
pub const TOKEN_KEY: &str = "jwt_token";

/// Storage key for the display name of the logged-in user.
pub const USERNAME_KEY: &str = "username";

/// Plain key/value persistence scoped to one API origin.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str);

    fn remove(&self, key: &str);

    /// Write several entries. Backends that can persist them in one step
    /// should override this.
    fn set_many(&self, entries: &[(&str, &str)]) {
        for (key, value) in entries {
            self.set(key, value);
        }
    }

    /// Remove several entries. Backends that can persist the removal in one
    /// step should override this.
    fn remove_many(&self, keys: &[&str]) {
        for key in keys {
            self.remove(key);
        }
    }
}

/// The two persisted entries, as read from a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credential {
    pub token: Option<String>,
    pub username: Option<String>,
}

impl Credential {
    pub fn load(store: &dyn CredentialStore) -> Self {
        Self {
            token: store.get(TOKEN_KEY),
            username: store.get(USERNAME_KEY),
        }
    }

    pub fn is_present(&self) -> bool {
        self.token.is_some()
    }
}
