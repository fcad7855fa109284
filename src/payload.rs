//! # Payload Codec
//!
//! A secret payload is plain text made of `KEY=VALUE` lines. The same format
//! is used for the remote secret and for local `.env` key files.
//!
//! Values are not escaped: a value containing `=` survives a round trip
//! (only the first `=` splits), a value containing a newline does not.
//! Payloads must be UTF-8. Anything else is rejected instead of being decoded
//! lossily and written back altered.

use std::collections::BTreeMap;
use std::str::Utf8Error;

/// Parsed payload, keyed by secret key
///
/// Ordered by key so that serialized payloads are stable across runs.
pub type SecretPayload = BTreeMap<String, String>;

/// A `(key, value)` pair contributed by a key source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEntry {
    pub key: String,
    pub value: String,
}

impl KeyEntry {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Parse raw payload bytes into a key/value map
///
/// Lines are split on `\n`, then on the first `=`. Lines without `=` are
/// ignored and the last occurrence of a duplicate key wins. Nothing is trimmed.
///
/// # Errors
/// Returns the `Utf8Error` if `raw` is not valid UTF-8.
pub fn parse(raw: &[u8]) -> Result<SecretPayload, Utf8Error> {
    let text = std::str::from_utf8(raw)?;
    let mut payload = SecretPayload::new();

    for line in text.split('\n') {
        if let Some((key, value)) = line.split_once('=') {
            payload.insert(key.to_string(), value.to_string());
        }
    }

    Ok(payload)
}

/// Serialize a payload as `key=value\n` lines
#[must_use]
pub fn serialize(payload: &SecretPayload) -> Vec<u8> {
    let mut out = String::new();
    for (key, value) in payload {
        out.push_str(key);
        out.push('=');
        out.push_str(value);
        out.push('\n');
    }
    out.into_bytes()
}

/// First line of the raw payload text, if it is non-empty UTF-8
///
/// Used for secrets that were seeded with a bare value before any keys existed.
#[must_use]
pub fn first_line(raw: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(raw).ok()?;
    text.split('\n')
        .next()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
}
