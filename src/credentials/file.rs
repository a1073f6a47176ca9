//! JSON-file credential store.
//!
//! Entries are kept in memory and rewritten to disk on every change. Writes
//! go to a sibling temp file first and are renamed into place, so a crash
//! never leaves a half-written credentials file behind.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tracing::{debug, warn};
use url::Url;

use super::CredentialStore;

/// Credential store persisted as a flat JSON object.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileCredentialStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A missing file is an empty store. An unreadable or corrupt file is
    /// logged and also treated as empty; it is replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = read_entries(&path);
        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    /// Store for one API origin under `<data_dir>/credentials/`.
    pub fn for_origin(data_dir: &Path, api_url: &Url) -> Self {
        let path = data_dir
            .join("credentials")
            .join(format!("{}.json", origin_slug(api_url)));
        Self::open(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn mutate(&self, f: impl FnOnce(&mut BTreeMap<String, String>) -> bool) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if f(&mut entries) {
            // Persist while still holding the lock so concurrent writers
            // cannot reorder their files on disk.
            if let Err(e) = write_entries(&self.path, &entries) {
                warn!(
                    "Failed to persist credentials to {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.set_many(&[(key, value)]);
    }

    fn remove(&self, key: &str) {
        self.remove_many(&[key]);
    }

    fn set_many(&self, pairs: &[(&str, &str)]) {
        self.mutate(|entries| {
            let mut changed = false;
            for (key, value) in pairs {
                let previous = entries.insert(key.to_string(), value.to_string());
                changed |= previous.as_deref() != Some(*value);
            }
            changed
        });
    }

    fn remove_many(&self, keys: &[&str]) {
        self.mutate(|entries| {
            let mut changed = false;
            for key in keys {
                changed |= entries.remove(*key).is_some();
            }
            changed
        });
    }
}

/// Filesystem-safe name for the scheme, host and port of `url`.
///
/// `http://localhost:8080/api` becomes `http_localhost_8080`.
pub fn origin_slug(url: &Url) -> String {
    let mut slug = url.scheme().to_string();
    if let Some(host) = url.host_str() {
        slug.push('_');
        slug.push_str(host);
    }
    if let Some(port) = url.port_or_known_default() {
        slug.push('_');
        slug.push_str(&port.to_string());
    }
    slug.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn read_entries(path: &Path) -> BTreeMap<String, String> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            warn!("Failed to read credentials from {}: {}", path.display(), e);
            return BTreeMap::new();
        }
    };

    match serde_json::from_str(&content) {
        Ok(entries) => {
            debug!("Loaded credentials from {}", path.display());
            entries
        }
        Err(e) => {
            warn!(
                "Ignoring corrupt credentials file {}: {}",
                path.display(),
                e
            );
            BTreeMap::new()
        }
    }
}

fn write_entries(path: &Path, entries: &BTreeMap<String, String>) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_vec_pretty(entries)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)?;
    restrict_permissions(&tmp)?;
    std::fs::rename(&tmp, path)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
