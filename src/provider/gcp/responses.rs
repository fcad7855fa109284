//! # Response Types
//!
//! GCP Secret Manager REST API response structures.
//!
//! API Reference: https://cloud.google.com/secret-manager/docs/reference/rest

use serde::{Deserialize, Serialize};

/// Secret payload containing the base64-encoded secret data
///
/// The API omits `data` for a version holding an empty payload.
///
/// API Reference: https://cloud.google.com/secret-manager/docs/reference/rest/v1/SecretPayload
#[derive(Debug, Serialize, Deserialize)]
pub struct SecretPayload {
    #[serde(default)]
    pub data: String,
}

/// Response from accessing a secret version
///
/// Returned by `GET /v1/projects/{project}/secrets/{secret}/versions/{version}:access`.
#[derive(Debug, Deserialize)]
pub struct AccessSecretVersionResponse {
    /// Resource name of the version that was actually read
    pub name: String,
    pub payload: SecretPayload,
}

/// Response from adding a secret version
///
/// Only the resource name of the new version is kept.
#[derive(Debug, Deserialize)]
pub struct SecretVersion {
    pub name: String,
}

/// GCP API error response wrapper
///
/// API Reference: https://cloud.google.com/apis/design/errors
#[derive(Debug, Deserialize)]
pub struct GcpErrorResponse {
    pub error: GcpError,
}

/// Detailed error information from GCP API
#[derive(Debug, Deserialize)]
pub struct GcpError {
    /// HTTP status code (e.g., 404, 403, 500)
    pub code: u16,
    pub message: String,
    /// Error status string (e.g., "NOT_FOUND", "PERMISSION_DENIED")
    #[serde(default)]
    pub status: String,
}

/// OAuth2 access token response from GCP metadata server
///
/// Endpoint: `http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token`
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    #[allow(dead_code, reason = "Required for deserialization but not used")]
    pub token_type: String,
    #[serde(default)]
    #[allow(dead_code, reason = "Required for deserialization but not used")]
    pub expires_in: u64,
}
