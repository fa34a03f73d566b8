use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::warn;

use super::store::Session;
use crate::models::User;

/// Key of the serialized principal.
pub const USER_KEY: &str = "user";
/// Key of the bearer token.
pub const TOKEN_KEY: &str = "token";

/// Durable session entries, one file per key beneath `root`.
#[derive(Debug, Clone)]
pub struct SessionFiles {
    root: PathBuf,
}

impl SessionFiles {
    /// Storage rooted at the given directory. Nothing is created until a write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the entries.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read one entry, `None` when absent.
    pub fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    /// Write one entry, creating the directory if needed.
    pub fn write(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create {}", self.root.display()))?;
        let path = self.entry_path(key);
        fs::write(&path, value).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Remove one entry. A missing entry is not an error.
    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("failed to remove {}", path.display())),
        }
    }

    /// Rehydrate a session when both entries are present and readable.
    ///
    /// Missing, unreadable or corrupted entries all yield `None`.
    pub fn load(&self) -> Option<Session> {
        let user = self.read_logged(USER_KEY)?;
        let token = self.read_logged(TOKEN_KEY)?;
        let token = token.trim().to_string();
        if token.is_empty() {
            warn!(root = %self.root.display(), "Stored token is empty; ignoring session");
            return None;
        }
        match serde_json::from_str::<User>(&user) {
            Ok(principal) => Some(Session {
                principal,
                credential: token,
            }),
            Err(err) => {
                warn!(
                    ?err,
                    root = %self.root.display(),
                    "Stored principal is corrupted; ignoring session"
                );
                None
            }
        }
    }

    /// Persist both entries. On failure the previous token is put back.
    pub fn store(&self, session: &Session) -> Result<()> {
        let user =
            serde_json::to_string(&session.principal).context("failed to serialize principal")?;
        let previous = self.read(TOKEN_KEY)?;
        self.write(TOKEN_KEY, &session.credential)?;
        if let Err(err) = self.write(USER_KEY, &user) {
            let rollback = match &previous {
                Some(token) => self.write(TOKEN_KEY, token),
                None => self.remove(TOKEN_KEY),
            };
            if let Err(rollback_err) = rollback {
                warn!(?rollback_err, "Failed to roll back session token");
            }
            return Err(err);
        }
        Ok(())
    }

    /// Remove both entries.
    pub fn clear(&self) -> Result<()> {
        let token = self.remove(TOKEN_KEY);
        let user = self.remove(USER_KEY);
        token.and(user)
    }

    fn read_logged(&self, key: &str) -> Option<String> {
        match self.read(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(?err, key, "Failed to read session entry");
                None
            }
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}
