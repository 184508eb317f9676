//! Proof-of-work puzzle for Forgechain

use crate::hashing::sha256_hex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Leading hex characters a winning digest must carry. Fixed difficulty,
/// no adjustment mechanism.
pub const DIFFICULTY_PREFIX: &str = "0000";

/// Check a candidate proof against the previous block's proof.
///
/// The puzzle hashes the decimal concatenation of both numbers and accepts
/// when the digest starts with [`DIFFICULTY_PREFIX`].
pub fn valid_proof(last_proof: u64, proof: u64) -> bool {
    let guess = format!("{}{}", last_proof, proof);
    sha256_hex(guess.as_bytes()).starts_with(DIFFICULTY_PREFIX)
}

/// Brute-force the smallest proof valid against `last_proof`.
///
/// CPU-bound; blocks the calling thread until a proof is found.
pub fn find_proof(last_proof: u64) -> u64 {
    let mut proof = 0u64;
    while !valid_proof(last_proof, proof) {
        proof += 1;
    }
    proof
}

/// Like [`find_proof`], but gives up once `stop` is raised.
///
/// The flag is checked between candidates, so a raise takes effect within
/// one hash evaluation. Returns `None` when interrupted.
pub fn find_proof_until(last_proof: u64, stop: &AtomicBool) -> Option<u64> {
    let mut proof = 0u64;
    loop {
        if stop.load(Ordering::Relaxed) {
            return None;
        }
        if valid_proof(last_proof, proof) {
            return Some(proof);
        }
        proof += 1;
    }
}
