//! # Key Sources
//!
//! Derive the key entries each mode contributes to the secret:
//! - `db-keys`: fixed key names for host, user and password
//! - `pv-keys`: every `<index>.env` file in a directory, keys suffixed `_<index>`
//! - `set-keys`: literal `KEY=VALUE` arguments

use crate::config::{ConfigError, DbCredentials, KeysDirectory, DB_PASS_FIELD};
use crate::constants::{DB_HOST_KEY, DB_PASS_KEY, DB_USER_KEY};
use crate::payload::{self, KeyEntry, SecretPayload};
use std::path::Path;
use std::str::Utf8Error;
use tracing::{debug, info, warn};

/// Entries for the `db-keys` mode
///
/// The password comes from flag/env when supplied. Otherwise a secret that
/// holds no keys yet is assumed to contain a bare password, and its first line
/// is used. A secret that already stores the password key keeps it untouched.
///
/// # Errors
/// Returns `ConfigError::Missing` when no password can be resolved.
pub fn db_key_entries(
    credentials: &DbCredentials,
    existing: &SecretPayload,
    raw_existing: &[u8],
) -> Result<Vec<KeyEntry>, ConfigError> {
    let mut entries = vec![
        KeyEntry::new(DB_HOST_KEY, credentials.host.as_str()),
        KeyEntry::new(DB_USER_KEY, credentials.user.as_str()),
    ];

    if let Some(password) = &credentials.password {
        entries.push(KeyEntry::new(DB_PASS_KEY, password.as_str()));
    } else if existing.is_empty() {
        let password = payload::first_line(raw_existing)
            .ok_or_else(|| ConfigError::Missing(vec![DB_PASS_FIELD]))?;
        info!("Using the bare password stored in the secret for {}", DB_PASS_KEY);
        entries.push(KeyEntry::new(DB_PASS_KEY, password));
    } else if existing.contains_key(DB_PASS_KEY) {
        debug!("No password supplied, keeping stored {}", DB_PASS_KEY);
    } else {
        return Err(ConfigError::Missing(vec![DB_PASS_FIELD]));
    }

    Ok(entries)
}

/// Key index of a key file: its name without `suffix`
///
/// Names that do not end in `suffix`, or consist of the suffix alone, are not
/// key files.
#[must_use]
pub fn key_file_index<'a>(file_name: &'a str, suffix: &str) -> Option<&'a str> {
    file_name
        .strip_suffix(suffix)
        .filter(|index| !index.is_empty())
}

/// Entries for a single key file's content
///
/// # Errors
/// Returns the `Utf8Error` if the file content is not valid UTF-8.
pub fn indexed_entries(contents: &[u8], index: &str) -> Result<Vec<KeyEntry>, Utf8Error> {
    Ok(payload::parse(contents)?
        .into_iter()
        .map(|(key, value)| KeyEntry::new(format!("{key}_{index}"), value))
        .collect())
}

/// Entries for the `pv-keys` mode
///
/// Files are processed in file-name order. A file that cannot be read, or
/// whose content is not UTF-8, is logged and skipped.
///
/// # Errors
/// Returns the I/O error if the directory itself cannot be listed.
pub async fn directory_key_entries(directory: &KeysDirectory) -> std::io::Result<Vec<KeyEntry>> {
    let mut key_files = Vec::new();
    let mut dir = tokio::fs::read_dir(&directory.path).await?;
    while let Some(entry) = dir.next_entry().await? {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            debug!("Skipping non UTF-8 file name: {:?}", file_name);
            continue;
        };
        if let Some(index) = key_file_index(name, &directory.suffix) {
            key_files.push((name.to_string(), index.to_string()));
        }
    }
    key_files.sort();

    let mut entries = Vec::new();
    for (name, index) in key_files {
        let path = directory.path.join(&name);
        match read_key_file(&path, &index).await {
            Ok(file_entries) => {
                debug!("Read {} keys from {}", file_entries.len(), path.display());
                entries.extend(file_entries);
            }
            Err(e) => {
                warn!("Error reading file {}: {}", name, e);
            }
        }
    }

    Ok(entries)
}

async fn read_key_file(path: &Path, index: &str) -> std::io::Result<Vec<KeyEntry>> {
    let contents = tokio::fs::read(path).await?;
    indexed_entries(&contents, index)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

/// Entries for the `set-keys` mode
///
/// # Errors
/// Returns `ConfigError::InvalidKeyArgument` listing every argument that has no
/// `=` or an empty key.
pub fn literal_key_entries(arguments: &[String]) -> Result<Vec<KeyEntry>, ConfigError> {
    let mut entries = Vec::with_capacity(arguments.len());
    let mut invalid = Vec::new();

    for argument in arguments {
        match argument.split_once('=') {
            Some((key, value)) if !key.is_empty() => entries.push(KeyEntry::new(key, value)),
            _ => invalid.push(argument.clone()),
        }
    }

    if invalid.is_empty() {
        Ok(entries)
    } else {
        Err(ConfigError::InvalidKeyArgument(invalid))
    }
}
