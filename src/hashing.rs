//! Canonical block hashing for Forgechain

use crate::error::Result;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// SHA-256 digest of raw bytes as a lowercase hex string.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Digest of a value's canonical JSON form.
///
/// The value is serialized through `serde_json::Value`, whose object
/// representation keeps keys in lexicographic order. Two blocks that are
/// logically equal therefore hash identically no matter how their fields
/// are laid out in memory.
pub fn canonical_digest<T: Serialize>(value: &T) -> Result<String> {
    let canonical = serde_json::to_value(value)?;
    let encoded = serde_json::to_string(&canonical)?;
    Ok(sha256_hex(encoded.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Reversed {
        beta: u64,
        alpha: u64,
    }

    #[derive(Serialize)]
    struct Ordered {
        alpha: u64,
        beta: u64,
    }

    #[test]
    fn test_sha256_known_vectors() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_digest_is_lowercase_hex() {
        let digest = canonical_digest(&Ordered { alpha: 1, beta: 2 }).unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_digest_ignores_field_declaration_order() {
        let a = canonical_digest(&Ordered { alpha: 7, beta: 9 }).unwrap();
        let b = canonical_digest(&Reversed { beta: 9, alpha: 7 }).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_digest_is_deterministic() {
        let value = Ordered { alpha: 42, beta: 1337 };
        assert_eq!(
            canonical_digest(&value).unwrap(),
            canonical_digest(&value).unwrap()
        );
    }

    #[test]
    fn test_digest_changes_with_content() {
        let a = canonical_digest(&Ordered { alpha: 1, beta: 2 }).unwrap();
        let b = canonical_digest(&Ordered { alpha: 1, beta: 3 }).unwrap();
        assert_ne!(a, b);
    }
}
