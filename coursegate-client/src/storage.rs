//! Client-side storage for access grants and the last used email
//!
//! Grants live in session storage and the email in persistent storage. Both
//! are best-effort: callers go through [`tolerate`] so a broken store never
//! blocks a login.

use coursegate_core::{storage_error, AccessGrant, GateResult, ACCESS_KEY, EMAIL_KEY};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Session-scoped storage of the current access grant
pub trait GrantStore: Send + Sync {
    /// Replace the stored grant
    fn save_grant(&self, grant: &AccessGrant) -> GateResult<()>;

    fn load_grant(&self) -> GateResult<Option<AccessGrant>>;
}

/// Persistent storage of the last email that logged in successfully
pub trait EmailStore: Send + Sync {
    fn save_email(&self, email: &str) -> GateResult<()>;

    fn load_email(&self) -> GateResult<Option<String>>;
}

/// Keep the value of a best-effort storage operation, logging and dropping
/// any failure.
pub fn tolerate<T>(operation: &str, result: GateResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(operation = operation, error = %e, "Ignoring storage failure");
            None
        }
    }
}

/// In-memory store, used for tests and one-shot sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    grant: Mutex<Option<AccessGrant>>,
    email: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: Mutex::new(Some(email.into())),
            ..Self::default()
        }
    }
}

impl GrantStore for MemoryStore {
    fn save_grant(&self, grant: &AccessGrant) -> GateResult<()> {
        let mut slot = self
            .grant
            .lock()
            .map_err(|_| storage_error!("Grant store lock poisoned", "memory_store"))?;
        *slot = Some(grant.clone());
        Ok(())
    }

    fn load_grant(&self) -> GateResult<Option<AccessGrant>> {
        let slot = self
            .grant
            .lock()
            .map_err(|_| storage_error!("Grant store lock poisoned", "memory_store"))?;
        Ok(slot.clone())
    }
}

impl EmailStore for MemoryStore {
    fn save_email(&self, email: &str) -> GateResult<()> {
        let mut slot = self
            .email
            .lock()
            .map_err(|_| storage_error!("Email store lock poisoned", "memory_store"))?;
        *slot = Some(email.to_string());
        Ok(())
    }

    fn load_email(&self) -> GateResult<Option<String>> {
        let slot = self
            .email
            .lock()
            .map_err(|_| storage_error!("Email store lock poisoned", "memory_store"))?;
        Ok(slot.clone())
    }
}

/// File-backed store keeping one file per key inside a directory.
///
/// The grant is written as JSON to `courseAccess.json` and the email as plain
/// text to `lastCourseEmail`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Session storage under the platform cache directory
    pub fn session() -> GateResult<Self> {
        dirs::cache_dir()
            .map(|dir| Self::new(dir.join("coursegate")))
            .ok_or_else(|| storage_error!("No cache directory on this platform", "file_store"))
    }

    /// Persistent storage under the platform config directory
    pub fn persistent() -> GateResult<Self> {
        dirs::config_dir()
            .map(|dir| Self::new(dir.join("coursegate")))
            .ok_or_else(|| storage_error!("No config directory on this platform", "file_store"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn grant_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", ACCESS_KEY))
    }

    fn email_path(&self) -> PathBuf {
        self.dir.join(EMAIL_KEY)
    }

    fn write(&self, path: &Path, contents: &str) -> GateResult<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(path, contents)?;
        Ok(())
    }

    fn read(&self, path: &Path) -> GateResult<Option<String>> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl GrantStore for FileStore {
    fn save_grant(&self, grant: &AccessGrant) -> GateResult<()> {
        let json = serde_json::to_string(grant)?;
        self.write(&self.grant_path(), &json)
    }

    fn load_grant(&self) -> GateResult<Option<AccessGrant>> {
        match self.read(&self.grant_path())? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

impl EmailStore for FileStore {
    fn save_email(&self, email: &str) -> GateResult<()> {
        self.write(&self.email_path(), email)
    }

    fn load_email(&self) -> GateResult<Option<String>> {
        Ok(self
            .read(&self.email_path())?
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty()))
    }
}
