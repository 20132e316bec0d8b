use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use threadmine_core::{Block, BlockError, MAX_DIFFICULTY};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::worker::{MiningSolution, MiningWorker};
use crate::error::MinerError;

/// Result of one mining race: the winning solution and the wall-clock time
/// the race took.
#[derive(Debug, Clone)]
pub struct RaceOutcome {
    pub solution: MiningSolution,
    pub elapsed: Duration,
}

/// Coordinates a fixed-size pool of workers racing over one candidate
/// block at a time.
///
/// Races are sequential: one `mine_block` call at a time per `Miner`.
pub struct Miner {
    num_workers: usize,
    difficulty: u8,
    stop_signal: Arc<AtomicBool>,
}

impl Miner {
    pub fn new(num_workers: usize, difficulty: u8) -> Result<Self, MinerError> {
        if num_workers == 0 {
            return Err(MinerError::NoWorkers);
        }
        if difficulty > MAX_DIFFICULTY {
            return Err(BlockError::UnreachableDifficulty(difficulty).into());
        }
        Ok(Self {
            num_workers,
            difficulty,
            stop_signal: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Race all workers over `candidate` and return the first solution.
    ///
    /// Every worker searches its own slice of the nonce space; the first to
    /// find a conforming hash sets the shared stop signal and the rest wind
    /// down. Returns [`MinerError::RaceAborted`] if [`Miner::stop`] ended
    /// the race before a solution was found.
    pub async fn mine_block(&self, candidate: Block) -> Result<RaceOutcome, MinerError> {
        info!(
            workers = self.num_workers,
            difficulty = self.difficulty,
            height = candidate.height,
            "starting mining race"
        );

        // A stop issued between races must not carry over into this one.
        self.stop_signal.store(false, Ordering::Relaxed);

        let (solution_tx, mut solution_rx) = mpsc::channel(self.num_workers);
        let start = Instant::now();

        let mut handles = Vec::with_capacity(self.num_workers);
        for worker_id in 0..self.num_workers {
            let worker = MiningWorker::new(
                Arc::clone(&self.stop_signal),
                solution_tx.clone(),
                worker_id,
                self.num_workers,
                self.difficulty,
            );
            let candidate = candidate.clone();
            handles.push(tokio::task::spawn_blocking(move || worker.mine(candidate)));
        }
        drop(solution_tx);

        // First message wins; if every sender is dropped without sending,
        // the race was stopped externally.
        let solution = solution_rx.recv().await;

        self.stop_signal.store(true, Ordering::Relaxed);
        for handle in handles {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("mining worker error: {e}"),
                Err(e) => return Err(MinerError::WorkerFailed(e.to_string())),
            }
        }

        let elapsed = start.elapsed();
        let solution = solution.ok_or(MinerError::RaceAborted)?;
        info!(
            worker = solution.worker_id,
            nonce = solution.block.nonce,
            attempts = solution.attempts,
            "mining race finished in {:.2}s",
            elapsed.as_secs_f64()
        );
        Ok(RaceOutcome { solution, elapsed })
    }

    /// End an in-flight race without a solution.
    pub fn stop(&self) {
        self.stop_signal.store(true, Ordering::Relaxed);
        info!("mining stopped");
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    pub fn difficulty(&self) -> u8 {
        self.difficulty
    }
}
