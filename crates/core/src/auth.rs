//! Admin sign-in.

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    api::{ApiClient, ApiError, LoginResponse},
    session::SessionStore,
};

/// Why a sign-in attempt did not produce a session.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The account exists but lacks the admin flag.
    #[error("access denied: this account is not an administrator")]
    NotAdmin,
    /// Bad credentials, unreachable server or malformed response.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The session could not be persisted.
    #[error("could not save the session: {0:#}")]
    Storage(anyhow::Error),
}

impl AuthError {
    /// Text for the inline error line of the login form.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Api(err) => match err.server_message() {
                Some(message) => message.to_string(),
                None => err.to_string(),
            },
            other => other.to_string(),
        }
    }
}

/// Sign in with e-mail and password and open an admin session.
pub async fn authenticate(
    api: &ApiClient,
    session: &SessionStore,
    email: &str,
    password: &str,
) -> Result<(), AuthError> {
    let response = api.login(email.trim(), password).await?;
    admit(response, session)
}

/// Accept a login response only for administrators.
pub fn admit(response: LoginResponse, session: &SessionStore) -> Result<(), AuthError> {
    if !response.user.is_admin {
        warn!(
            user_id = response.user.id,
            username = %response.user.username,
            "Rejected non-admin login"
        );
        return Err(AuthError::NotAdmin);
    }
    info!(user_id = response.user.id, "Admin login accepted");
    session
        .login(response.user, response.token)
        .map_err(AuthError::Storage)
}
