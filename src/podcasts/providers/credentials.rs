//! Podchaser credential pairs and the rotation cursor.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::warn;

/// One API key / secret pair.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPair {
    pub key: String,
    pub secret: String,
}

impl CredentialPair {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// Last six characters of the key, safe to log.
    pub fn key_hint(&self) -> &str {
        let start = self
            .key
            .char_indices()
            .rev()
            .nth(5)
            .map(|(i, _)| i)
            .unwrap_or(0);
        &self.key[start..]
    }
}

impl std::fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPair")
            .field("key", &format_args!("…{}", self.key_hint()))
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Parse `key1:secret1,key2:secret2` into ordered pairs.
///
/// Entries without a `:` or with an empty key or secret are skipped with a
/// warning; parsing never fails.
pub fn parse_credentials(raw: &str) -> Vec<CredentialPair> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match entry.split_once(':') {
            Some((key, secret)) if !key.trim().is_empty() && !secret.trim().is_empty() => {
                Some(CredentialPair::new(key.trim(), secret.trim()))
            }
            _ => {
                warn!(
                    provider = "podchaser",
                    "Malformed credential entry (expected 'key:secret'), skipping"
                );
                None
            }
        })
        .collect()
}

/// Ordered credential pairs with a shared "current pair" cursor.
#[derive(Debug)]
pub struct CredentialRotator {
    pairs: Vec<CredentialPair>,
    current: AtomicUsize,
}

impl CredentialRotator {
    pub fn new(pairs: Vec<CredentialPair>) -> Self {
        Self {
            pairs,
            current: AtomicUsize::new(0),
        }
    }

    pub fn from_config_string(raw: &str) -> Self {
        Self::new(parse_credentials(raw))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Index of the pair new requests start from.
    pub fn current_index(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }

    pub fn pair(&self, index: usize) -> Option<&CredentialPair> {
        self.pairs.get(index)
    }

    /// Move the cursor past `from`. Returns the new index, or `None` when
    /// `from` was the last pair (the cursor is left untouched).
    pub fn advance(&self, from: usize) -> Option<usize> {
        let next = from + 1;
        if next >= self.pairs.len() {
            return None;
        }
        self.current.store(next, Ordering::SeqCst);
        Some(next)
    }

    /// Put the cursor back to `index`.
    pub fn reset(&self, index: usize) {
        self.current.store(index, Ordering::SeqCst);
    }
}
