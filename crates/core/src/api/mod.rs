//! REST client for the dashboard API.
//!
//! One configured [`reqwest::Client`] with a fixed base address. The bearer
//! credential is read from the [`SessionStore`] when each request is built,
//! never cached on the client.

mod error;
pub mod payload;

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::debug;

pub use error::ApiError;
pub use payload::{Attachment, FormPayload};

use crate::{
    config::AppConfig,
    models::User,
    resource::{Lookup, LookupEntry, Resource, ResourceKind},
    session::SessionStore,
};

/// Unauthenticated login endpoint.
pub const LOGIN_PATH: &str = "/api/dashboard/login";
/// Admin flag toggle endpoint.
pub const ADMIN_TOGGLE_PATH: &str = "/api/dashboard/user/is_admin";

/// Body returned by a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// The authenticated account.
    pub user: User,
    /// Bearer token for subsequent calls.
    pub token: String,
}

/// Shared HTTP client bound to the API base address.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    media_base_url: String,
    session: SessionStore,
}

impl ApiClient {
    /// Build a client from configuration and the session handle.
    pub fn new(config: &AppConfig, session: SessionStore) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            http: builder.build()?,
            base_url: trim_base(&config.api_base_url),
            media_base_url: trim_base(config.media_base()),
            session,
        })
    }

    /// Absolute URL of an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Resolve a relative media path returned by the API.
    pub fn media_url(&self, relative: &str) -> String {
        let relative = relative.trim();
        if relative.starts_with("http://") || relative.starts_with("https://") {
            return relative.to_string();
        }
        format!("{}/{}", self.media_base_url, relative.trim_start_matches('/'))
    }

    /// Exchange credentials for a principal and token.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        debug!(email, "Submitting login");
        let response = self
            .http
            .post(self.url(LOGIN_PATH))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        read_json(response).await
    }

    /// Fetch the full collection for `R`.
    pub async fn list<R: Resource>(&self) -> Result<Vec<R>, ApiError> {
        let path = R::KIND.list_path();
        debug!(path, "Fetching collection");
        let response = self.get(path)?.send().await?;
        read_json(response).await
    }

    /// Create a record and return the server's canonical copy.
    pub async fn create<R: Resource>(&self, payload: FormPayload) -> Result<R, ApiError> {
        let path = R::KIND.create_path();
        debug!(path = %path, multipart = payload.is_multipart(), "Creating record");
        let response = self.send_payload(&path, payload).await?;
        let value: Value = read_json(response).await?;
        unwrap_record(value, R::KIND.singular())
    }

    /// Update a record and return the server's canonical copy.
    pub async fn update<R: Resource>(&self, id: u64, payload: FormPayload) -> Result<R, ApiError> {
        let path = R::KIND.update_path(id);
        debug!(path = %path, multipart = payload.is_multipart(), "Updating record");
        let response = self.send_payload(&path, payload).await?;
        let value: Value = read_json(response).await?;
        unwrap_record(value, R::KIND.singular())
    }

    /// Delete a record. Any response body is ignored.
    pub async fn delete(&self, kind: ResourceKind, id: u64) -> Result<(), ApiError> {
        let path = kind.delete_path(id);
        debug!(path = %path, "Deleting record");
        let request = self.authorized(self.http.delete(self.url(&path)))?;
        ensure_success(request.send().await?).await?;
        Ok(())
    }

    /// Set the admin flag and return the server's view of the user.
    pub async fn set_admin(&self, user_id: u64, is_admin: bool) -> Result<User, ApiError> {
        debug!(user_id, is_admin, "Updating admin flag");
        let request = self
            .authorized(self.http.post(self.url(ADMIN_TOGGLE_PATH)))?
            .json(&json!({ "user_id": user_id, "is_admin": is_admin }));
        let value: Value = read_json(request.send().await?).await?;
        unwrap_record(value, ResourceKind::Users.singular())
    }

    /// Fetch the `(id, label)` options of a reference selector.
    pub async fn lookup(&self, lookup: Lookup) -> Result<Vec<LookupEntry>, ApiError> {
        let path = lookup.path();
        debug!(path, "Fetching lookup");
        let values: Vec<Value> = read_json(self.get(path)?.send().await?).await?;
        Ok(values
            .iter()
            .filter_map(|value| LookupEntry::from_value(lookup, value))
            .collect())
    }

    fn get(&self, path: &str) -> Result<RequestBuilder, ApiError> {
        self.authorized(self.http.get(self.url(path)))
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let token = self
            .session
            .credential()
            .ok_or(ApiError::MissingCredential)?;
        Ok(request.bearer_auth(token))
    }

    async fn send_payload(&self, path: &str, payload: FormPayload) -> Result<Response, ApiError> {
        let request = self.authorized(self.http.post(self.url(path)))?;
        let request = if payload.is_multipart() {
            request.multipart(payload.into_multipart().await?)
        } else {
            request.json(&payload.to_json())
        };
        Ok(request.send().await?)
    }
}

fn trim_base(base: &str) -> String {
    base.trim().trim_end_matches('/').to_string()
}

async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::from_status(status, &body))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let response = ensure_success(response).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Accept both `{"<key>": {...}}` envelopes and bare records.
fn unwrap_record<T: DeserializeOwned>(value: Value, key: &str) -> Result<T, ApiError> {
    let record = match value {
        Value::Object(mut object) if object.get(key).is_some_and(Value::is_object) => {
            object.remove(key).unwrap_or(Value::Null)
        }
        other => other,
    };
    Ok(serde_json::from_value(record)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Group, Post};
    use tempfile::tempdir;

    fn client(base: &str, media: Option<&str>) -> ApiClient {
        let dir = tempdir().expect("tempdir");
        let config = AppConfig {
            api_base_url: base.to_string(),
            media_base_url: media.map(str::to_string),
            request_timeout_secs: None,
            session_dir: dir.path().to_path_buf(),
            log_dir: dir.path().to_path_buf(),
        };
        ApiClient::new(&config, SessionStore::new(dir.path())).expect("client")
    }

    #[test]
    fn joins_paths_without_double_slashes() {
        let api = client("http://localhost:8000/", None);
        assert_eq!(
            api.url("/api/dashboard/users"),
            "http://localhost:8000/api/dashboard/users"
        );
        assert_eq!(
            api.media_url("storage/avatars/a.png"),
            "http://localhost:8000/storage/avatars/a.png"
        );
    }

    #[test]
    fn media_paths_use_media_base() {
        let api = client("http://localhost:8000", Some("https://cdn.example.com/"));
        assert_eq!(
            api.media_url("/covers/c.jpg"),
            "https://cdn.example.com/covers/c.jpg"
        );
        assert_eq!(
            api.media_url("https://elsewhere/x.png"),
            "https://elsewhere/x.png"
        );
    }

    #[tokio::test]
    async fn protected_calls_need_a_credential() {
        let api = client("http://127.0.0.1:9", None);
        let err = api.list::<Group>().await.expect_err("no session");
        assert!(matches!(err, ApiError::MissingCredential));
    }

    #[test]
    fn unwraps_enveloped_and_bare_records() {
        let wrapped = json!({"group": {"id": 3, "name": "LAN"}, "message": "created"});
        let group: Group = unwrap_record(wrapped, "group").expect("group");
        assert_eq!(group.id, 3);

        let bare = json!({"id": 4, "content": "hi", "group": {"id": 3, "name": "LAN"}});
        let post: Post = unwrap_record(bare, "post").expect("post");
        assert_eq!(post.group_ref_id(), Some(3));
    }
}
