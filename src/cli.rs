//! # CLI
//!
//! Command-line surface of `secret-key-sync`.
//!
//! ## Usage
//!
//! ```bash
//! # Merge /keys/*.env into the secret, never overwriting existing keys
//! secret-key-sync --project-id my-project --secret-id sequencer-keys pv-keys
//!
//! # Upsert database credentials
//! secret-key-sync --project-id my-project --secret-id sequencer-db db-keys \
//!     --db-host db.internal --db-user sequencer
//!
//! # Upsert literal keys
//! secret-key-sync set-keys API_KEY=abc FEATURE_FLAG=on
//! ```
//!
//! Every flag falls back to an environment variable, so the tool can run as a
//! Kubernetes Job configured entirely from the pod spec.

use crate::constants::{DEFAULT_KEYS_PATH, DEFAULT_KEY_FILE_SUFFIX, DEFAULT_PROPAGATION_DELAY_SECS};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Merge keys into a Google Cloud Secret Manager secret
#[derive(Debug, Parser)]
#[command(name = "secret-key-sync", version)]
#[command(
    about = "Merge .env keys and database credentials into a Secret Manager secret",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// GCP project that owns the secret
    #[arg(long, global = true, env = "PROJECT_ID")]
    pub project_id: Option<String>,

    /// Secret to read and append versions to
    #[arg(long, global = true, env = "SECRET_ID")]
    pub secret_id: Option<String>,

    /// Secret Manager REST endpoint (defaults to the public Google API)
    #[arg(long, global = true, env = "GCP_SECRET_MANAGER_ENDPOINT")]
    pub endpoint: Option<String>,

    /// OAuth2 access token (defaults to the metadata server token)
    #[arg(long, global = true, env = "GCP_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Seconds to wait after a write before reading the secret back
    #[arg(
        long,
        global = true,
        env = "PROPAGATION_DELAY_SECS",
        default_value_t = DEFAULT_PROPAGATION_DELAY_SECS
    )]
    pub propagation_delay_secs: u64,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Update the secret with Sequencer private keys from a directory of .env files
    ///
    /// Each key of `<index>.env` is stored as `KEY_<index>`. Keys already in
    /// the secret are never overwritten.
    PvKeys {
        /// Directory containing the .env files with the private keys
        #[arg(long, env = "KEYS_PATH", default_value = DEFAULT_KEYS_PATH)]
        keys_path: PathBuf,

        /// File name suffix of key files; the rest of the name is the key index
        #[arg(long, env = "KEY_SUFFIX", default_value = DEFAULT_KEY_FILE_SUFFIX)]
        key_suffix: String,
    },
    /// Update the secret with database connection keys
    DbKeys {
        /// Database host URL
        #[arg(long, env = "SEQUENCER_POSTGRES_HOST")]
        db_host: Option<String>,

        /// Database username
        #[arg(long, env = "SEQUENCER_POSTGRES_USER")]
        db_user: Option<String>,

        /// Database password (defaults to a bare password already stored in the secret)
        #[arg(long, env = "SEQUENCER_POSTGRES_PASS", hide_env_values = true)]
        db_pass: Option<String>,
    },
    /// Update the secret with literal KEY=VALUE pairs
    SetKeys {
        /// Only add keys that are not in the secret yet
        #[arg(long)]
        skip_existing: bool,

        #[arg(value_name = "KEY=VALUE", required = true)]
        keys: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_db_keys_with_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "secret-key-sync",
            "db-keys",
            "--db-host",
            "db.internal",
            "--db-user",
            "sequencer",
            "--project-id",
            "p",
            "--secret-id",
            "s",
        ])
        .unwrap();

        assert_eq!(cli.project_id.as_deref(), Some("p"));
        assert_eq!(cli.secret_id.as_deref(), Some("s"));
        match cli.command {
            Commands::DbKeys {
                db_host, db_user, ..
            } => {
                assert_eq!(db_host.as_deref(), Some("db.internal"));
                assert_eq!(db_user.as_deref(), Some("sequencer"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_set_keys_requires_at_least_one_key() {
        let result = Cli::try_parse_from(["secret-key-sync", "set-keys"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_set_keys_collects_arguments() {
        let cli = Cli::try_parse_from([
            "secret-key-sync",
            "set-keys",
            "--skip-existing",
            "A=1",
            "B=2",
        ])
        .unwrap();
        match cli.command {
            Commands::SetKeys {
                skip_existing,
                keys,
            } => {
                assert!(skip_existing);
                assert_eq!(keys, vec!["A=1".to_string(), "B=2".to_string()]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
