//! # Provider Modules
//!
//! The remote secret store the tool reads from and writes to.
//!
//! Stores are versioned and append-only: a write always creates a new version,
//! and reads address a version by name (usually `latest`).

use async_trait::async_trait;
use thiserror::Error;

pub mod gcp;

/// Errors returned by a secret store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("secret not found: {0}")]
    NotFound(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("secret store unavailable: {0}")]
    Unavailable(String),
    #[error("failed to authenticate with the secret store: {0}")]
    Auth(String),
    #[error("secret store API error: {0}")]
    Api(String),
    #[error("failed to decode secret store response: {0}")]
    Decode(String),
}

/// A versioned secret store holding one payload per version
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Read the payload of `version` of `secret_id`
    async fn fetch(&self, secret_id: &str, version: &str) -> Result<Vec<u8>, StoreError>;

    /// Append a new version of `secret_id` holding `payload`
    async fn add_version(&self, secret_id: &str, payload: &[u8]) -> Result<(), StoreError>;
}
