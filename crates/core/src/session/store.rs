use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use parking_lot::RwLock;
use tracing::{info, warn};

use super::storage::SessionFiles;
use crate::models::User;

/// Authenticated principal and its bearer credential.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// The signed-in administrator.
    pub principal: User,
    /// Opaque bearer token issued at login.
    pub credential: String,
}

impl Session {
    fn is_valid(&self) -> bool {
        !self.credential.trim().is_empty() && !self.principal.username.is_empty()
    }
}

/// Lifecycle of the session as seen by route guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Durable storage has not been read yet.
    Restoring,
    /// A principal and credential are present.
    Authenticated,
    /// No usable session.
    Anonymous,
}

/// Thread-safe handle on the admin session.
///
/// Every mutation updates durable storage and memory in the same call;
/// when the durable write fails memory is left untouched.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug)]
struct Inner {
    files: SessionFiles,
    phase: SessionPhase,
    session: Option<Session>,
}

impl SessionStore {
    /// Build a store persisting into `root`. The phase starts as `Restoring`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                files: SessionFiles::new(root),
                phase: SessionPhase::Restoring,
                session: None,
            })),
        }
    }

    /// Read durable storage and rehydrate memory. Corruption means anonymous.
    pub fn restore(&self) -> SessionPhase {
        let mut inner = self.inner.write();
        let session = inner.files.load().filter(Session::is_valid);
        inner.phase = if session.is_some() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        };
        if let Some(session) = &session {
            info!(
                user_id = session.principal.id,
                username = %session.principal.username,
                "Session restored"
            );
        }
        inner.session = session;
        inner.phase
    }

    /// Store the principal and credential. The login response is trusted as-is.
    pub fn login(&self, principal: User, credential: impl Into<String>) -> Result<()> {
        let session = Session {
            principal,
            credential: credential.into(),
        };
        let mut inner = self.inner.write();
        inner.files.store(&session)?;
        inner.phase = if session.is_valid() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        };
        info!(user_id = session.principal.id, username = %session.principal.username, "Signed in");
        inner.session = Some(session);
        Ok(())
    }

    /// Drop the session from storage and memory.
    ///
    /// Memory is cleared even when an entry cannot be removed: a lone entry
    /// never restores as a session, so anonymous is what storage holds.
    pub fn logout(&self) -> Result<()> {
        let mut inner = self.inner.write();
        let cleared = inner.files.clear();
        inner.session = None;
        inner.phase = SessionPhase::Anonymous;
        match &cleared {
            Ok(()) => info!("Signed out"),
            Err(err) => warn!(?err, "Signed out with a stale session entry left behind"),
        }
        cleared
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.inner.read().phase
    }

    /// True iff a principal and non-empty credential are present.
    pub fn is_authenticated(&self) -> bool {
        let inner = self.inner.read();
        inner.phase == SessionPhase::Authenticated
            && inner.session.as_ref().is_some_and(Session::is_valid)
    }

    /// The signed-in administrator.
    pub fn principal(&self) -> Option<User> {
        let inner = self.inner.read();
        inner
            .session
            .as_ref()
            .filter(|_| inner.phase == SessionPhase::Authenticated)
            .map(|session| session.principal.clone())
    }

    /// Bearer token, read fresh on every call.
    pub fn credential(&self) -> Option<String> {
        let inner = self.inner.read();
        inner
            .session
            .as_ref()
            .filter(|session| inner.phase == SessionPhase::Authenticated && session.is_valid())
            .map(|session| session.credential.clone())
    }
}
