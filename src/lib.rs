//! # Secret Key Sync
//!
//! Merges key/value secrets into the `latest` version of a single Google Cloud
//! Secret Manager secret whose payload is a list of `KEY=VALUE` lines.
//!
//! Keys come from one of three sources, selected by subcommand:
//! - **pv-keys**: a directory of `<index>.env` files; every key is stored as
//!   `KEY_<index>` and existing keys are never overwritten
//! - **db-keys**: database host, user and password under fixed key names
//! - **set-keys**: literal `KEY=VALUE` arguments
//!
//! A new secret version is written only when a key was added or changed.

pub mod cli;
pub mod config;
pub mod constants;
pub mod payload;
pub mod provider;
pub mod reconcile;
pub mod sources;
pub mod sync;
