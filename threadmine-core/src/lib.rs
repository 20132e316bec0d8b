//! Core types for the threadmine proof-of-work blockchain.
//!
//! The library holds everything that does not involve worker threads:
//! hashing, the block and chain types, proof-of-work checks, and chain
//! validation. The `miner` crate builds the concurrent search on top.

// Enforce panic-free code in production
#![cfg_attr(not(test), warn(clippy::unwrap_used))]
#![cfg_attr(not(test), warn(clippy::expect_used))]
#![cfg_attr(not(test), warn(clippy::panic))]
// Test-specific allows
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod chain;
pub mod error;
pub mod hash;
pub mod types;

pub use chain::Blockchain;
pub use error::{BlockError, ChainError, CoreError, CoreResult};
pub use hash::{hash256, leading_zero_nibbles, Hash256};
pub use types::block::{Block, MAX_DIFFICULTY};
