//! # Reconciler
//!
//! Merges incoming key entries into the payload fetched from the secret store.
//!
//! Under `OverwriteOnChange` each entry is compared with the payload as built
//! so far, so the last entry for a key decides its final value. Under
//! `SkipIfPresent` presence is checked against the payload passed in, never
//! against entries inserted earlier in the same call: two incoming entries for
//! the same absent key both count as inserts and the later one wins.

use crate::payload::{KeyEntry, SecretPayload};

/// How an incoming entry is applied when its key already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertPolicy {
    /// Insert absent keys, overwrite keys whose value differs
    OverwriteOnChange,
    /// Insert absent keys, never touch existing ones
    SkipIfPresent,
}

impl std::fmt::Display for UpsertPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpsertPolicy::OverwriteOnChange => write!(f, "overwrite-on-change"),
            UpsertPolicy::SkipIfPresent => write!(f, "skip-if-present"),
        }
    }
}

/// Result of a reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub payload: SecretPayload,
    pub changed: bool,
    /// Keys that were absent from the existing payload
    pub added: Vec<String>,
    /// Existing keys whose value was overwritten
    pub updated: Vec<String>,
}

/// Apply `incoming` to `existing` under `policy`
#[must_use]
pub fn reconcile(
    existing: &SecretPayload,
    incoming: &[KeyEntry],
    policy: UpsertPolicy,
) -> Reconciled {
    let mut payload = existing.clone();
    let mut changed = false;
    let mut added = Vec::new();
    let mut updated = Vec::new();

    for entry in incoming {
        let current = match policy {
            UpsertPolicy::OverwriteOnChange => payload.get(&entry.key),
            UpsertPolicy::SkipIfPresent => existing.get(&entry.key),
        };
        let write = match current {
            None => true,
            Some(value) => policy == UpsertPolicy::OverwriteOnChange && value != &entry.value,
        };
        if !write {
            continue;
        }

        payload.insert(entry.key.clone(), entry.value.clone());
        changed = true;
        let touched = if existing.contains_key(&entry.key) {
            &mut updated
        } else {
            &mut added
        };
        if !touched.contains(&entry.key) {
            touched.push(entry.key.clone());
        }
    }

    Reconciled {
        payload,
        changed,
        added,
        updated,
    }
}
