//! Authenticated HTTP client for the Shopfront backend API.
//!
//! Every request is built from a replayable [`ApiRequest`] description and
//! carries the stored bearer credential when one exists. A 401 response
//! triggers a single refresh-and-replay cycle: the refresh token is
//! exchanged for a new access token and the original request is re-issued
//! exactly once. A failed exchange clears the stored credentials, expires
//! the session, and surfaces [`ApiError::SessionExpired`].

mod credentials;
mod request;

pub use credentials::{CredentialPair, CredentialStore};
pub use request::{ApiRequest, FormPart, RequestBody};

use std::sync::Arc;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::session::SessionHandle;
use crate::storage::StorageError;

/// Relative path of the credential refresh endpoint.
const REFRESH_PATH: &str = "users/token/refresh/";

/// Longest error detail kept from a response body.
const MAX_ERROR_DETAIL_CHARS: usize = 200;

/// API client errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connection refused, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the backend.
    #[error("HTTP {status}: {detail}")]
    Status { status: StatusCode, detail: String },

    /// The requested entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The refresh exchange failed; all credentials have been cleared.
    #[error("Session expired")]
    SessionExpired,

    /// Response body did not match the expected shape.
    #[error("Malformed response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// A multipart file part could not be read from disk.
    #[error("Could not read upload {path}: {source}")]
    Upload {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Durable credential storage failed.
    #[error("Credential storage error: {0}")]
    Storage(#[from] StorageError),

    /// Request path could not be joined onto the API base.
    #[error("Invalid request path: {0}")]
    InvalidPath(String),
}

/// Payload returned by the refresh endpoint.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
}

/// Authenticated HTTP client.
///
/// Cloning is cheap; all clones share the connection pool and observe the
/// same stored credentials.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base: Url,
    credentials: CredentialStore,
    session: SessionHandle,
}

impl ApiClient {
    /// Create a client from the loaded configuration.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created. This should never happen
    /// under normal circumstances as we use standard TLS configuration.
    #[must_use]
    pub(crate) fn new(
        config: &ClientConfig,
        credentials: CredentialStore,
        session: SessionHandle,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            inner: Arc::new(ApiClientInner {
                http,
                base: config.api_base.clone(),
                credentials,
                session,
            }),
        }
    }

    /// The credential store backing this client.
    pub(crate) fn credentials(&self) -> &CredentialStore {
        &self.inner.credentials
    }

    // =========================================================================
    // Typed helpers
    // =========================================================================

    /// GET `path` and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure, non-success status, or a
    /// body that does not decode as `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let bytes = self.execute(ApiRequest::get(path)).await?;
        serde_json::from_slice(&bytes).map_err(ApiError::Decode)
    }

    /// POST a JSON body to `path` and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure, non-success status, or a
    /// body that does not decode as `T`.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Value,
    ) -> Result<T, ApiError> {
        let bytes = self.execute(ApiRequest::post(path, body)).await?;
        serde_json::from_slice(&bytes).map_err(ApiError::Decode)
    }

    /// POST a multipart form to `path` and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure, non-success status, an
    /// unreadable file part, or a body that does not decode as `T`.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        parts: Vec<FormPart>,
    ) -> Result<T, ApiError> {
        let bytes = self.execute(ApiRequest::post_multipart(path, parts)).await?;
        serde_json::from_slice(&bytes).map_err(ApiError::Decode)
    }

    /// PUT a multipart form to `path` and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure, non-success status, an
    /// unreadable file part, or a body that does not decode as `T`.
    pub async fn put_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        parts: Vec<FormPart>,
    ) -> Result<T, ApiError> {
        let bytes = self.execute(ApiRequest::put_multipart(path, parts)).await?;
        serde_json::from_slice(&bytes).map_err(ApiError::Decode)
    }

    /// DELETE `path`, discarding any response body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or non-success status.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(ApiRequest::delete(path)).await.map(|_| ())
    }

    // =========================================================================
    // Pipeline
    // =========================================================================

    /// Execute a request through the authenticated pipeline.
    ///
    /// On a 401 with a stored refresh token, exchanges the refresh token
    /// for a new access token and replays the request once. The replay's
    /// outcome is final: a second 401 propagates as a plain status error,
    /// so the pipeline can never loop.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::SessionExpired` when the refresh exchange fails
    /// (credentials are cleared and the session expired first), otherwise
    /// the transport, status, or storage error encountered.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn execute(&self, request: ApiRequest) -> Result<Vec<u8>, ApiError> {
        let response = self.dispatch(&request).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::finalize(response).await;
        }

        let Some(refresh) = self.inner.credentials.refresh()? else {
            // Nothing to refresh with; surface the 401 as-is.
            return Self::finalize(response).await;
        };

        debug!("Access credential rejected, attempting refresh");
        match self.refresh_access(&refresh).await {
            Ok(access) => {
                self.inner.credentials.set_access(&access)?;
                let retried = self.dispatch(&request).await?;
                Self::finalize(retried).await
            }
            Err(err) => {
                warn!(error = %err, "Refresh exchange failed, clearing session");
                if let Err(err) = self.inner.credentials.clear() {
                    warn!(error = %err, "Could not clear stored credentials");
                }
                self.inner.session.expire();
                Err(ApiError::SessionExpired)
            }
        }
    }

    /// Build and send the wire request with the current access token.
    async fn dispatch(&self, request: &ApiRequest) -> Result<reqwest::Response, ApiError> {
        let url = self.join(&request.path)?;
        let mut builder = self.inner.http.request(request.method.clone(), url);

        if let Some(access) = self.inner.credentials.access()? {
            builder = builder.bearer_auth(access.expose_secret());
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts).await?),
        };

        Ok(builder.send().await?)
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Deliberately unauthenticated: the refresh endpoint validates the
    /// refresh token itself, not the (stale) access token.
    async fn refresh_access(&self, refresh: &SecretString) -> Result<SecretString, ApiError> {
        let url = self.join(REFRESH_PATH)?;
        let response = self
            .inner
            .http
            .post(url)
            .json(&serde_json::json!({ "refresh": refresh.expose_secret() }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = error_detail(response.text().await.unwrap_or_default());
            return Err(ApiError::Status { status, detail });
        }

        let payload: RefreshResponse = response.json().await?;
        Ok(SecretString::from(payload.access))
    }

    /// Turn a response into bytes or the matching error.
    async fn finalize(response: reqwest::Response) -> Result<Vec<u8>, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.bytes().await?.to_vec());
        }

        let detail = error_detail(response.text().await.unwrap_or_default());
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(detail));
        }
        Err(ApiError::Status { status, detail })
    }

    fn join(&self, path: &str) -> Result<Url, ApiError> {
        self.inner
            .base
            .join(path)
            .map_err(|_| ApiError::InvalidPath(path.to_owned()))
    }
}

/// Build a `reqwest` multipart form from part descriptions, reading file
/// parts from disk.
async fn build_form(parts: &[FormPart]) -> Result<reqwest::multipart::Form, ApiError> {
    let mut form = reqwest::multipart::Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
            FormPart::File { name, path } => {
                let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::Upload {
                    path: path.clone(),
                    source,
                })?;
                let file_name = path.file_name().map_or_else(
                    || "upload".to_owned(),
                    |name| name.to_string_lossy().into_owned(),
                );
                form.part(
                    name.clone(),
                    reqwest::multipart::Part::bytes(bytes).file_name(file_name),
                )
            }
        };
    }
    Ok(form)
}

/// Server-provided error detail, truncated, or a generic fallback.
fn error_detail(body: String) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "request failed".to_owned();
    }
    trimmed.chars().take(MAX_ERROR_DETAIL_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::Storage;

    fn test_client(base: &str) -> (tempfile::TempDir, ApiClient) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        let config = ClientConfig {
            api_base: Url::parse(base).unwrap(),
            storage_dir: dir.path().to_path_buf(),
            http_timeout: std::time::Duration::from_secs(5),
        };
        let client = ApiClient::new(
            &config,
            CredentialStore::new(storage.clone()),
            SessionHandle::new(storage),
        );
        (dir, client)
    }

    #[test]
    fn test_join_keeps_base_path_segment() {
        let (_dir, client) = test_client("http://127.0.0.1:8000/api/");
        let url = client.join("products/my-products/").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/api/products/my-products/");
    }

    #[test]
    fn test_error_detail_falls_back_when_empty() {
        assert_eq!(error_detail(String::new()), "request failed");
        assert_eq!(error_detail("  \n ".to_owned()), "request failed");
    }

    #[test]
    fn test_error_detail_truncates_long_bodies() {
        let long = "x".repeat(1000);
        assert_eq!(error_detail(long).len(), MAX_ERROR_DETAIL_CHARS);
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            detail: "price required".to_owned(),
        };
        assert_eq!(err.to_string(), "HTTP 400 Bad Request: price required");

        let err = ApiError::NotFound("product p-1".to_owned());
        assert_eq!(err.to_string(), "Not found: product p-1");
    }
}
