//! Registry of peer nodes participating in consensus

use crate::error::{ChainError, Result};
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;

const MAX_ADDRESS_LENGTH: usize = 256;

/// Thread-safe set of peer addresses in bare `host:port` form.
///
/// Addresses are held in a sorted set, so every sweep over the directory
/// visits peers in the same order regardless of registration order.
#[derive(Debug, Clone, Default)]
pub struct PeerDirectory {
    inner: Arc<RwLock<BTreeSet<String>>>,
}

impl PeerDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        PeerDirectory {
            inner: Arc::new(RwLock::new(BTreeSet::new())),
        }
    }

    /// Normalize `address` and add it to the directory.
    ///
    /// Accepts plain `host:port` as well as full URLs; the scheme and any
    /// path are stripped, and the port must be a non-zero decimal.
    /// Registering an already-known peer is a no-op. Returns the
    /// normalized form that was stored.
    pub fn register(&self, address: &str) -> Result<String> {
        let normalized = normalize_address(address)?;
        self.inner.write().insert(normalized.clone());
        Ok(normalized)
    }

    /// All known peers in sorted order.
    pub fn list(&self) -> Vec<String> {
        self.inner.read().iter().cloned().collect()
    }

    pub fn contains(&self, address: &str) -> bool {
        self.inner.read().contains(address)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

/// Reduce a peer address to its bare `host:port` authority.
fn normalize_address(address: &str) -> Result<String> {
    let trimmed = address.trim();

    if trimmed.len() > MAX_ADDRESS_LENGTH {
        return Err(ChainError::InvalidPeerAddress(format!(
            "address too long (max {} characters)",
            MAX_ADDRESS_LENGTH
        )));
    }

    // Strip "scheme://" when present; "host:port" alone has no "//".
    let without_scheme = match trimmed.split_once("://") {
        Some((_, rest)) => rest,
        None => trimmed,
    };

    // Anything after the first slash is a path, not part of the authority.
    let authority = match without_scheme.split_once('/') {
        Some((authority, _)) => authority,
        None => without_scheme,
    };

    if authority.is_empty() {
        return Err(ChainError::InvalidPeerAddress(format!(
            "'{}' has no host",
            address
        )));
    }
    if authority.chars().any(|c| c.is_whitespace()) {
        return Err(ChainError::InvalidPeerAddress(format!(
            "'{}' contains whitespace",
            address
        )));
    }

    let (host, port) = match authority.rsplit_once(':') {
        Some(parts) => parts,
        None => {
            return Err(ChainError::InvalidPeerAddress(format!(
                "'{}' has no port",
                address
            )))
        }
    };

    if host.is_empty() {
        return Err(ChainError::InvalidPeerAddress(format!(
            "'{}' has an empty host",
            address
        )));
    }
    match port.parse::<u16>() {
        Ok(port) if port != 0 => {}
        _ => {
            return Err(ChainError::InvalidPeerAddress(format!(
                "'{}' has an invalid port",
                address
            )))
        }
    }

    Ok(authority.to_string())
}
