//! # Constants
//!
//! Shared constants used throughout the tool.
//!
//! These values represent reasonable defaults and can be overridden via
//! command-line flags or environment variables where applicable.

/// Secret version every fetch targets
pub const LATEST_VERSION: &str = "latest";

/// Default GCP Secret Manager REST endpoint
pub const DEFAULT_GCP_SECRET_MANAGER_ENDPOINT: &str = "https://secretmanager.googleapis.com";

/// GCE/GKE metadata server token endpoint (Workload Identity)
pub const GCP_METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Default delay between writing a new version and re-reading it (seconds)
/// Heuristic only; Secret Manager gives no read-after-write guarantee here
pub const DEFAULT_PROPAGATION_DELAY_SECS: u64 = 5;

/// Default directory scanned by `pv-keys`
pub const DEFAULT_KEYS_PATH: &str = "/keys";

/// Default file name suffix for key files in `pv-keys`
pub const DEFAULT_KEY_FILE_SUFFIX: &str = ".env";

/// Output key for the database host in `db-keys`
pub const DB_HOST_KEY: &str = "ESPRESSO_SEQUENCER_POSTGRES_HOST";

/// Output key for the database user in `db-keys`
pub const DB_USER_KEY: &str = "ESPRESSO_SEQUENCER_POSTGRES_USER";

/// Output key for the database password in `db-keys`
pub const DB_PASS_KEY: &str = "ESPRESSO_SEQUENCER_POSTGRES_PASS";

