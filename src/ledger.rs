//! Ledger module split into chain state and validation

pub mod chain;
pub mod validation;

pub use chain::*;
pub use validation::*;
