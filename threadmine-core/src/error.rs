//! Error types for the threadmine core library.

use thiserror::Error;

use crate::types::block::MAX_DIFFICULTY;

/// Block-related errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlockError {
    #[error("difficulty {0} exceeds the {MAX_DIFFICULTY} hex digits of a SHA-256 hash")]
    UnreachableDifficulty(u8),
}

/// Chain validation errors; each variant names the offending block height.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("block {height}: stored hash does not match its contents")]
    HashMismatch { height: u64 },

    #[error("block {height}: previous-hash link is broken")]
    BrokenLink { height: u64 },

    #[error("block at position {position} carries height {height}, expected {expected}")]
    BadHeight {
        position: usize,
        height: u64,
        expected: u64,
    },

    #[error("block {height}: hash does not meet difficulty {difficulty}")]
    DifficultyNotMet { height: u64, difficulty: u8 },

    #[error("mined block (height {height}) does not extend the current tip (height {tip})")]
    NotOnTip { height: u64, tip: u64 },

    #[error("chain is empty; a chain always starts with a genesis block")]
    MissingGenesis,
}

/// Main error type for threadmine core operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Block-related errors
    #[error("block error: {0}")]
    Block(#[from] BlockError),

    /// Chain validation errors
    #[error("chain error: {0}")]
    Chain(#[from] ChainError),
}

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;
