//! Durable storage of the session credential.
//!
//! A store holds at most one opaque token. Storage problems are never
//! surfaced to callers: an unreadable token is simply absent and a failed
//! write is logged.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};
use url::Url;

/// Scoped storage for the current session token.
pub trait TokenStore: Send + Sync {
    /// Persist `token`, replacing any previous one.
    fn save(&self, token: &str);

    /// The stored token, `None` when absent or unreadable.
    fn read(&self) -> Option<String>;

    /// Forget the stored token.
    fn clear(&self);
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Process-local token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn save(&self, token: &str) {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
    }

    fn read(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn clear(&self) {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// Token persisted to a single file, surviving process restarts.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    // Serializes file access; the runtime may call in from several threads.
    io: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            io: Mutex::new(()),
        }
    }

    /// Store scoped to the origin of `base_url` under the user data directory.
    pub fn for_origin(base_url: &Url) -> Self {
        Self::new(default_token_path(base_url))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn save(&self, token: &str) {
        let _guard = self.io.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(parent) = self.path.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warn!(path = %parent.display(), "cannot create token directory: {e}");
            return;
        }
        match fs::write(&self.path, token) {
            Ok(()) => debug!(path = %self.path.display(), "token saved"),
            Err(e) => warn!(path = %self.path.display(), "cannot save token: {e}"),
        }
    }

    fn read(&self) -> Option<String> {
        let _guard = self.io.lock().unwrap_or_else(PoisonError::into_inner);
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %self.path.display(), "cannot read token: {e}");
                None
            }
        }
    }

    fn clear(&self) {
        let _guard = self.io.lock().unwrap_or_else(PoisonError::into_inner);
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "token cleared"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), "cannot clear token: {e}"),
        }
    }
}

/// `<data_dir>/jsp/<origin>/token`, one file per backend origin.
pub fn default_token_path(base_url: &Url) -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("jsp")
        .join(origin_slug(base_url))
        .join("token")
}

/// Filesystem-safe rendering of the URL origin, e.g. `https_api.example.org_443`.
fn origin_slug(url: &Url) -> String {
    let host = url.host_str().unwrap_or("local");
    let port = url.port_or_known_default().unwrap_or(0);
    format!("{}_{}_{}", url.scheme(), host, port)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '_' { c } else { '-' })
        .collect()
}
