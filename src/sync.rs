//! # Secret Sync
//!
//! One linear run against the secret store:
//!
//! 1. Fetch the `latest` version and parse it
//! 2. Derive the incoming key entries for the configured mode
//! 3. Reconcile them with the mode's policy
//! 4. Append a new version only if something changed
//! 5. Wait for the new version to become readable
//! 6. Re-fetch and report the final payload
//!
//! Every step either succeeds or aborts the run. The only tolerated failure is
//! an unreadable key file in `pv-keys` mode, which is logged and skipped.

use crate::config::{Config, ConfigError, Mode};
use crate::constants::LATEST_VERSION;
use crate::payload::{self, KeyEntry, SecretPayload};
use crate::provider::{SecretStore, StoreError};
use crate::reconcile::reconcile;
use crate::sources::{db_key_entries, directory_key_entries};
use std::path::PathBuf;
use std::str::Utf8Error;
use thiserror::Error;
use tracing::{info, info_span, Instrument};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to access initial secret: {0}")]
    InitialFetch(#[source] StoreError),
    #[error("Secret payload is not valid UTF-8: {0}")]
    InvalidPayload(#[source] Utf8Error),
    #[error("Failed to update secret: {0}")]
    Write(#[source] StoreError),
    #[error("Failed to access final secret: {0}")]
    FinalFetch(#[source] StoreError),
    #[error("Failed to read directory {}: {source}", .path.display())]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Whether a new version was written
    pub changed: bool,
    pub added: Vec<String>,
    pub updated: Vec<String>,
    /// Raw payload of `latest` after the run
    pub final_payload: Vec<u8>,
}

/// Derive the incoming entries for `mode`
async fn incoming_entries(
    mode: &Mode,
    existing: &SecretPayload,
    raw_existing: &[u8],
) -> Result<Vec<KeyEntry>, SyncError> {
    match mode {
        Mode::PvKeys(directory) => directory_key_entries(directory).await.map_err(|source| {
            SyncError::ReadDirectory {
                path: directory.path.clone(),
                source,
            }
        }),
        Mode::DbKeys(credentials) => Ok(db_key_entries(credentials, existing, raw_existing)?),
        Mode::SetKeys { entries, .. } => Ok(entries.clone()),
    }
}

/// Merge the configured keys into the secret and report the result
///
/// # Errors
/// Returns `SyncError` if a store call fails, the stored payload is not UTF-8,
/// the keys directory cannot be listed, or no database password can be resolved.
pub async fn run(config: &Config, store: &dyn SecretStore) -> Result<SyncReport, SyncError> {
    let span = info_span!(
        "secret.sync",
        mode = config.mode.name(),
        project.id = config.project_id.as_str(),
        secret.name = config.secret_id.as_str()
    );

    async move {
        let raw_existing = store
            .fetch(&config.secret_id, LATEST_VERSION)
            .await
            .map_err(SyncError::InitialFetch)?;
        let existing = payload::parse(&raw_existing).map_err(SyncError::InvalidPayload)?;
        info!("Loaded {} existing keys", existing.len());

        let incoming = incoming_entries(&config.mode, &existing, &raw_existing).await?;
        let policy = config.mode.policy();
        let reconciled = reconcile(&existing, &incoming, policy);
        info!(
            "Reconciled {} incoming keys ({}): {} added, {} updated",
            incoming.len(),
            policy,
            reconciled.added.len(),
            reconciled.updated.len()
        );

        if reconciled.changed {
            store
                .add_version(&config.secret_id, &payload::serialize(&reconciled.payload))
                .await
                .map_err(SyncError::Write)?;
            info!("Secrets updated");
        } else {
            info!("No new secrets to update");
        }

        info!(
            "Sleeping for {} seconds to allow the secret to propagate",
            config.propagation_delay.as_secs()
        );
        tokio::time::sleep(config.propagation_delay).await;

        let final_payload = store
            .fetch(&config.secret_id, LATEST_VERSION)
            .await
            .map_err(SyncError::FinalFetch)?;
        info!(
            "Final Secret Contents:\n{}",
            String::from_utf8_lossy(&final_payload)
        );

        Ok(SyncReport {
            changed: reconciled.changed,
            added: reconciled.added,
            updated: reconciled.updated,
            final_payload,
        })
    }
    .instrument(span)
    .await
}
