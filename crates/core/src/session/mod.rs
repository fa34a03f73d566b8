//! Persisted admin session and its storage.

mod storage;
mod store;

pub use storage::{SessionFiles, TOKEN_KEY, USER_KEY};
pub use store::{Session, SessionPhase, SessionStore};
