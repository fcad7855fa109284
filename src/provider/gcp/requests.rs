//! # Request Types
//!
//! GCP Secret Manager REST API request structures.
//!
//! API Reference: https://cloud.google.com/secret-manager/docs/reference/rest

use serde::Serialize;

use super::responses::SecretPayload;

/// Request body for adding a new version to an existing secret
///
/// Used in `POST /v1/projects/{project}/secrets/{secret}:addVersion`.
/// The payload data must be base64-encoded before sending.
#[derive(Debug, Serialize)]
pub struct AddVersionRequest {
    pub payload: SecretPayload,
}

impl AddVersionRequest {
    /// Create a new request with already base64-encoded data
    #[must_use]
    pub fn new(data: String) -> Self {
        Self {
            payload: SecretPayload { data },
        }
    }
}
