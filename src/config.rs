//! # Configuration
//!
//! Immutable run configuration, built once from the parsed command line and
//! passed by reference into [`crate::sync::run`].
//!
//! Validation collects every missing required field and every malformed
//! `set-keys` argument before failing, so a misconfigured job reports all of
//! its problems in a single run.

use crate::cli::{Cli, Commands};
use crate::payload::KeyEntry;
use crate::reconcile::UpsertPolicy;
use crate::sources::literal_key_entries;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const PROJECT_ID_FIELD: &str = "project-id (PROJECT_ID)";
pub const SECRET_ID_FIELD: &str = "secret-id (SECRET_ID)";
pub const DB_HOST_FIELD: &str = "db-host (SEQUENCER_POSTGRES_HOST)";
pub const DB_USER_FIELD: &str = "db-user (SEQUENCER_POSTGRES_USER)";
pub const DB_PASS_FIELD: &str = "db-pass (SEQUENCER_POSTGRES_PASS)";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required configuration: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("invalid key arguments, expected KEY=VALUE: {}", .0.join(", "))]
    InvalidKeyArgument(Vec<String>),
    #[error(
        "missing required configuration: {}; invalid key arguments, expected KEY=VALUE: {}",
        .missing.join(", "),
        .invalid.join(", ")
    )]
    Invalid {
        missing: Vec<&'static str>,
        invalid: Vec<String>,
    },
}

impl ConfigError {
    /// Combine the collected problems into one error, if there are any
    fn collect(missing: Vec<&'static str>, invalid: Vec<String>) -> Option<Self> {
        match (missing.is_empty(), invalid.is_empty()) {
            (true, true) => None,
            (false, true) => Some(Self::Missing(missing)),
            (true, false) => Some(Self::InvalidKeyArgument(invalid)),
            (false, false) => Some(Self::Invalid { missing, invalid }),
        }
    }
}

/// Directory of `<index><suffix>` key files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeysDirectory {
    pub path: PathBuf,
    pub suffix: String,
}

/// Database credentials as supplied by flags or environment
#[derive(Clone, PartialEq, Eq)]
pub struct DbCredentials {
    pub host: String,
    pub user: String,
    /// `None` when neither flag nor environment supplied a password
    pub password: Option<String>,
}

impl std::fmt::Debug for DbCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbCredentials")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Which keys are derived and how they are merged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    PvKeys(KeysDirectory),
    DbKeys(DbCredentials),
    SetKeys {
        entries: Vec<KeyEntry>,
        policy: UpsertPolicy,
    },
}

impl Mode {
    /// Reconciliation policy used by this mode
    #[must_use]
    pub fn policy(&self) -> UpsertPolicy {
        match self {
            Mode::PvKeys(_) => UpsertPolicy::SkipIfPresent,
            Mode::DbKeys(_) => UpsertPolicy::OverwriteOnChange,
            Mode::SetKeys { policy, .. } => *policy,
        }
    }

    /// Subcommand name, for logging
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Mode::PvKeys(_) => "pv-keys",
            Mode::DbKeys(_) => "db-keys",
            Mode::SetKeys { .. } => "set-keys",
        }
    }
}

/// Validated settings for one run
///
/// `endpoint` and `access_token` stay `None` when unset, in which case the
/// client uses the public API and the metadata server token.
#[derive(Clone)]
pub struct Config {
    pub project_id: String,
    pub secret_id: String,
    pub endpoint: Option<String>,
    pub access_token: Option<String>,
    /// Wait between writing and re-fetching the secret
    pub propagation_delay: Duration,
    pub mode: Mode,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("project_id", &self.project_id)
            .field("secret_id", &self.secret_id)
            .field("endpoint", &self.endpoint)
            .field("propagation_delay", &self.propagation_delay)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// Treat unset and empty values alike
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl Config {
    /// Validate the parsed command line
    ///
    /// # Errors
    /// Returns `ConfigError::Missing` listing every missing required field,
    /// `ConfigError::InvalidKeyArgument` for malformed `set-keys` arguments, or
    /// `ConfigError::Invalid` when both kinds of problem are present.
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let mut missing = Vec::new();
        let mut invalid = Vec::new();

        let project_id = non_empty(cli.project_id);
        if project_id.is_none() {
            missing.push(PROJECT_ID_FIELD);
        }
        let secret_id = non_empty(cli.secret_id);
        if secret_id.is_none() {
            missing.push(SECRET_ID_FIELD);
        }

        let mode = match cli.command {
            Commands::PvKeys {
                keys_path,
                key_suffix,
            } => Some(Mode::PvKeys(KeysDirectory {
                path: keys_path,
                suffix: key_suffix,
            })),
            Commands::DbKeys {
                db_host,
                db_user,
                db_pass,
            } => {
                let host = non_empty(db_host);
                if host.is_none() {
                    missing.push(DB_HOST_FIELD);
                }
                let user = non_empty(db_user);
                if user.is_none() {
                    missing.push(DB_USER_FIELD);
                }
                host.zip(user).map(|(host, user)| {
                    Mode::DbKeys(DbCredentials {
                        host,
                        user,
                        password: db_pass,
                    })
                })
            }
            Commands::SetKeys {
                skip_existing,
                keys,
            } => {
                let policy = if skip_existing {
                    UpsertPolicy::SkipIfPresent
                } else {
                    UpsertPolicy::OverwriteOnChange
                };
                match literal_key_entries(&keys) {
                    Ok(entries) => Some(Mode::SetKeys { entries, policy }),
                    Err(ConfigError::InvalidKeyArgument(arguments)) => {
                        invalid = arguments;
                        None
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        if let Some(error) = ConfigError::collect(missing, invalid) {
            return Err(error);
        }

        match (project_id, secret_id, mode) {
            (Some(project_id), Some(secret_id), Some(mode)) => Ok(Self {
                project_id,
                secret_id,
                endpoint: non_empty(cli.endpoint),
                access_token: non_empty(cli.access_token),
                propagation_delay: Duration::from_secs(cli.propagation_delay_secs),
                mode,
            }),
            // every None above recorded a missing field
            _ => Err(ConfigError::Missing(Vec::new())),
        }
    }
}
