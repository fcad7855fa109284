//! Common test utilities for integration tests
//!
//! Provides rustls crypto provider setup for the Pact tests and an in-memory
//! secret store for sync tests.

use async_trait::async_trait;
use secret_key_sync::provider::{SecretStore, StoreError};
use std::sync::{Mutex, Once};

static RUSTLS_INIT: Once = Once::new();

/// Initialize rustls crypto provider for tests
///
/// Uses a `Once` to ensure it's only called once across all tests.
pub fn init_rustls() {
    RUSTLS_INIT.call_once(|| {
        rustls::crypto::ring::default_provider()
            .install_default()
            .expect("Failed to install rustls crypto provider");
    });
}

/// Which store call should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Nothing,
    FirstFetch,
    Write,
}

/// Versioned in-memory store for a single secret
#[derive(Debug)]
pub struct InMemoryStore {
    secret_id: String,
    versions: Mutex<Vec<Vec<u8>>>,
    fetches: Mutex<usize>,
    fail_on: FailOn,
}

impl InMemoryStore {
    /// Store whose secret `secret_id` has one version holding `initial`
    pub fn with_payload(secret_id: &str, initial: &str) -> Self {
        Self::with_raw_payload(secret_id, initial.as_bytes())
    }

    pub fn with_raw_payload(secret_id: &str, initial: &[u8]) -> Self {
        Self {
            secret_id: secret_id.to_string(),
            versions: Mutex::new(vec![initial.to_vec()]),
            fetches: Mutex::new(0),
            fail_on: FailOn::Nothing,
        }
    }

    pub fn failing(mut self, fail_on: FailOn) -> Self {
        self.fail_on = fail_on;
        self
    }

    /// Number of versions, including the initial one
    pub fn version_count(&self) -> usize {
        self.versions.lock().unwrap().len()
    }

    pub fn fetch_count(&self) -> usize {
        *self.fetches.lock().unwrap()
    }

    pub fn latest(&self) -> Vec<u8> {
        self.versions.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl SecretStore for InMemoryStore {
    async fn fetch(&self, secret_id: &str, version: &str) -> Result<Vec<u8>, StoreError> {
        let mut fetches = self.fetches.lock().unwrap();
        *fetches += 1;
        if self.fail_on == FailOn::FirstFetch && *fetches == 1 {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        if secret_id != self.secret_id {
            return Err(StoreError::NotFound(format!("Secret [{secret_id}] not found")));
        }
        assert_eq!(version, "latest");
        Ok(self.latest())
    }

    async fn add_version(&self, secret_id: &str, payload: &[u8]) -> Result<(), StoreError> {
        if self.fail_on == FailOn::Write {
            return Err(StoreError::PermissionDenied("caller lacks addVersion".to_string()));
        }
        if secret_id != self.secret_id {
            return Err(StoreError::NotFound(format!("Secret [{secret_id}] not found")));
        }
        self.versions.lock().unwrap().push(payload.to_vec());
        Ok(())
    }
}
