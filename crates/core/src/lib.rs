#![warn(clippy::all, missing_docs)]

//! Core logic for the sgadmin console.
//!
//! This crate hosts the entity models, configuration handling, the
//! persisted admin session, the REST client and the generic resource
//! screen state used by the terminal UI and any future frontends.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod nav;
pub mod resource;
pub mod session;

pub use api::{ApiClient, ApiError, FormPayload};
pub use auth::AuthError;
pub use config::AppConfig;
pub use models::{Game, Genre, Group, Platform, Post, Privacy, User};
pub use nav::{Guard, Route};
pub use resource::{Notice, Resource, ResourceKind, ResourceScreen};
pub use session::{SessionPhase, SessionStore};
