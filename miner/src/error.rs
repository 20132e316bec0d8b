use thiserror::Error;
use threadmine_core::{BlockError, ChainError};

/// Mining errors
#[derive(Debug, Error)]
pub enum MinerError {
    #[error("at least one mining worker is required")]
    NoWorkers,

    #[error("block error: {0}")]
    Block(#[from] BlockError),

    #[error("chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("mining race ended without a solution")]
    RaceAborted,

    #[error("mining worker task failed: {0}")]
    WorkerFailed(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
