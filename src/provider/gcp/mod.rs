//! # GCP Secret Manager REST Client
//!
//! Native REST implementation for GCP Secret Manager API v1.
//! Uses reqwest for HTTP requests and an OAuth2 bearer token for authentication.
//!
//! Only the two calls the tool needs are implemented: accessing a version and
//! adding a version. The secret itself must already exist.
//!
//! References:
//! - [GCP Secret Manager REST API v1](https://cloud.google.com/secret-manager/docs/reference/rest)

mod requests;
mod responses;

use requests::AddVersionRequest;
use responses::{AccessSecretVersionResponse, GcpErrorResponse, SecretVersion, TokenResponse};

use crate::constants::{DEFAULT_GCP_SECRET_MANAGER_ENDPOINT, GCP_METADATA_TOKEN_URL};
use crate::provider::{SecretStore, StoreError};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, StatusCode};
use tracing::{debug, info, info_span, Instrument};

/// GCP Secret Manager REST client
pub struct SecretManagerREST {
    http_client: Client,
    base_url: String,
    project_id: String,
    access_token: String,
}

impl std::fmt::Debug for SecretManagerREST {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretManagerREST")
            .field("project_id", &self.project_id)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl SecretManagerREST {
    /// Create a client for `project_id`
    ///
    /// `endpoint` overrides the public API base URL (emulators, mock servers).
    /// When `access_token` is `None` a token is requested from the metadata
    /// server, which works on GCE/GKE with Workload Identity.
    ///
    /// # Errors
    /// Returns `StoreError::Auth` if no token can be obtained.
    pub async fn new(
        project_id: String,
        endpoint: Option<String>,
        access_token: Option<String>,
    ) -> Result<Self, StoreError> {
        let base_url = endpoint
            .unwrap_or_else(|| DEFAULT_GCP_SECRET_MANAGER_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        info!("Initializing GCP REST client for project: {}", project_id);
        if base_url != DEFAULT_GCP_SECRET_MANAGER_ENDPOINT {
            info!("Using Secret Manager endpoint {}", base_url);
        }

        let http_client = Client::builder()
            .build()
            .map_err(|e| StoreError::Unavailable(format!("failed to create HTTP client: {e}")))?;

        let access_token = match access_token {
            Some(token) => {
                debug!("Using access token from configuration");
                token
            }
            None => Self::metadata_access_token(&http_client).await?,
        };

        Ok(Self {
            http_client,
            base_url,
            project_id,
            access_token,
        })
    }

    /// Get an OAuth2 access token from the metadata server (Workload Identity)
    async fn metadata_access_token(http_client: &Client) -> Result<String, StoreError> {
        let response = http_client
            .get(GCP_METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| {
                StoreError::Auth(format!(
                    "metadata server not reachable ({e}); set GCP_ACCESS_TOKEN or run with Workload Identity"
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Auth(format!(
                "metadata server returned status {status}: {body}"
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            StoreError::Auth(format!("failed to parse metadata server token response: {e}"))
        })?;
        info!("Retrieved access token from metadata server (Workload Identity)");
        Ok(token.access_token)
    }

    /// Get the project ID
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn secret_path(&self, secret_id: &str) -> String {
        format_secret_path(&self.project_id, secret_id)
    }

    /// Build HTTP request with authentication headers
    fn make_request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/v1/{}", self.base_url, path);

        // Add "Bearer " prefix if not already present
        let auth_header = if self.access_token.starts_with("Bearer ") {
            self.access_token.clone()
        } else {
            format!("Bearer {}", self.access_token)
        };

        self.http_client
            .request(method, url)
            .header("Authorization", auth_header)
            .header("Content-Type", "application/json")
    }
}

/// Formats a GCP secret resource path
#[must_use]
pub fn format_secret_path(project_id: &str, secret_id: &str) -> String {
    format!("projects/{project_id}/secrets/{secret_id}")
}

/// Formats a GCP secret version path
#[must_use]
pub fn format_secret_version_path(project_id: &str, secret_id: &str, version: &str) -> String {
    format!("projects/{project_id}/secrets/{secret_id}/versions/{version}")
}

/// Map a failed GCP API response onto the store error taxonomy
///
/// Prefers the `status` of a GCP error body, falling back to the HTTP status.
#[must_use]
pub fn classify_error_response(status: StatusCode, error_text: &str) -> StoreError {
    let (grpc_status, message) = match serde_json::from_str::<GcpErrorResponse>(error_text) {
        Ok(response) => (
            response.error.status,
            format!(
                "{} (code: {}, status: {})",
                response.error.message, response.error.code, status
            ),
        ),
        Err(_) => (
            String::new(),
            format!("HTTP {} (status: {}): {}", status.as_u16(), status, error_text),
        ),
    };

    match grpc_status.as_str() {
        "NOT_FOUND" => return StoreError::NotFound(message),
        "PERMISSION_DENIED" | "UNAUTHENTICATED" => return StoreError::PermissionDenied(message),
        "UNAVAILABLE" | "RESOURCE_EXHAUSTED" | "DEADLINE_EXCEEDED" => {
            return StoreError::Unavailable(message)
        }
        _ => {}
    }

    match status {
        StatusCode::NOT_FOUND => StoreError::NotFound(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::PermissionDenied(message),
        StatusCode::TOO_MANY_REQUESTS => StoreError::Unavailable(message),
        s if s.is_server_error() => StoreError::Unavailable(message),
        _ => StoreError::Api(message),
    }
}

fn transport_error(context: &str, e: &reqwest::Error) -> StoreError {
    StoreError::Unavailable(format!("{context}: {e}"))
}

#[async_trait]
impl SecretStore for SecretManagerREST {
    async fn fetch(&self, secret_id: &str, version: &str) -> Result<Vec<u8>, StoreError> {
        let span = info_span!(
            "gcp.secret.fetch",
            secret.name = secret_id,
            project.id = self.project_id(),
            secret.version = version
        );

        async move {
            let path = format!(
                "{}:access",
                format_secret_version_path(&self.project_id, secret_id, version)
            );

            let response = self
                .make_request(reqwest::Method::GET, &path)
                .send()
                .await
                .map_err(|e| transport_error("failed to access secret version", &e))?;

            let status = response.status();
            if !status.is_success() {
                let error_text = response.text().await.unwrap_or_default();
                return Err(classify_error_response(status, &error_text));
            }

            let access_response: AccessSecretVersionResponse = response
                .json()
                .await
                .map_err(|e| StoreError::Decode(format!("invalid access response: {e}")))?;
            debug!("Read secret version {}", access_response.name);

            general_purpose::STANDARD
                .decode(access_response.payload.data.as_bytes())
                .map_err(|e| StoreError::Decode(format!("payload is not valid base64: {e}")))
        }
        .instrument(span)
        .await
    }

    async fn add_version(&self, secret_id: &str, payload: &[u8]) -> Result<(), StoreError> {
        let span = info_span!(
            "gcp.secret.add_version",
            secret.name = secret_id,
            project.id = self.project_id()
        );

        async move {
            let request = AddVersionRequest::new(general_purpose::STANDARD.encode(payload));
            let path = format!("{}:addVersion", self.secret_path(secret_id));

            let response = self
                .make_request(reqwest::Method::POST, &path)
                .json(&request)
                .send()
                .await
                .map_err(|e| transport_error("failed to add secret version", &e))?;

            let status = response.status();
            if !status.is_success() {
                let error_text = response.text().await.unwrap_or_default();
                return Err(classify_error_response(status, &error_text));
            }

            match response.json::<SecretVersion>().await {
                Ok(version) => info!("Created secret version {}", version.name),
                Err(e) => debug!("Version created but response could not be parsed: {}", e),
            }
            Ok(())
        }
        .instrument(span)
        .await
    }
}
