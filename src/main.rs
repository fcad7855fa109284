//! # secret-key-sync
//!
//! Entry point: install the TLS provider, initialize logging, validate the
//! configuration, and run one sync against GCP Secret Manager.

use anyhow::{Context, Result};
use clap::Parser;
use secret_key_sync::cli::Cli;
use secret_key_sync::config::Config;
use secret_key_sync::provider::gcp::SecretManagerREST;
use secret_key_sync::sync;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Configure rustls crypto provider FIRST, before any other operations
    // Required for rustls 0.23+ when no default provider is set via features
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|provider| {
            anyhow::anyhow!("Failed to install rustls crypto provider: {provider:?}")
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "secret_key_sync=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_cli(cli).context("Invalid configuration")?;
    info!(
        "Running {} for secret {} in project {}",
        config.mode.name(),
        config.secret_id,
        config.project_id
    );

    let store = SecretManagerREST::new(
        config.project_id.clone(),
        config.endpoint.clone(),
        config.access_token.clone(),
    )
    .await
    .context("Failed to setup client")?;

    let report = sync::run(&config, &store).await?;
    if report.changed {
        info!(
            "Done: {} keys added, {} keys updated",
            report.added.len(),
            report.updated.len()
        );
    } else {
        info!("Done: secret already up to date");
    }

    Ok(())
}
