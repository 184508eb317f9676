//! Forgechain - A proof-of-work blockchain ledger with HTTP consensus
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Core Ledger
//! - [`ledger`] - Chain state, transactions and validation
//! - [`pow`] - Proof-of-work search and verification
//! - [`hashing`] - Canonical block hashing (SHA-256)
//!
//! ## Consensus & Networking
//! - [`consensus`] - Longest-chain conflict resolution
//! - [`peers`] - Peer directory management
//! - [`node`] - Node orchestration (mining, resolution)
//!
//! ## Integration
//! - [`api`] - REST API server
//!
//! ## Configuration & Utilities
//! - [`clock`] - Time source abstraction
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod hashing;
pub mod ledger;
pub mod pow;

// ============================================================================
// Consensus & Networking
// ============================================================================
pub mod consensus;
pub mod node;
pub mod peers;

// ============================================================================
// Integration
// ============================================================================
pub mod api;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod clock;
pub mod config;
pub mod error;
