pub mod coordinator;
pub mod worker;

pub use coordinator::{Miner, RaceOutcome};
pub use worker::{MiningSolution, MiningWorker};

/// Nonce attempts between worker progress log lines.
pub const PROGRESS_LOG_INTERVAL: u64 = 1_000_000;
