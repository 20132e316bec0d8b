use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use threadmine_core::{Block, BlockError, MAX_DIFFICULTY};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::PROGRESS_LOG_INTERVAL;
use crate::error::MinerError;

/// A solved candidate: the mined block, the worker that found it, and how
/// many nonces that worker tried.
#[derive(Debug, Clone, Serialize)]
pub struct MiningSolution {
    pub block: Block,
    pub worker_id: usize,
    pub attempts: u64,
}

pub struct MiningWorker {
    pub(crate) stop_signal: Arc<AtomicBool>,
    pub(crate) solution_sender: mpsc::Sender<MiningSolution>,
    pub(crate) worker_id: usize,
    pub(crate) num_workers: usize,
    pub(crate) difficulty: u8,
}

impl MiningWorker {
    pub fn new(
        stop_signal: Arc<AtomicBool>,
        solution_sender: mpsc::Sender<MiningSolution>,
        worker_id: usize,
        num_workers: usize,
        difficulty: u8,
    ) -> Self {
        Self {
            stop_signal,
            solution_sender,
            worker_id,
            num_workers,
            difficulty,
        }
    }

    /// Search the nonce space until the candidate's hash meets the
    /// difficulty or the shared stop signal is set.
    ///
    /// This call blocks; run it on a dedicated thread
    /// (`tokio::task::spawn_blocking` in the coordinator). Workers partition
    /// the nonce space: each starts at its own id and strides by the worker
    /// count, so no two workers test the same nonce.
    pub fn mine(&self, mut block: Block) -> Result<(), MinerError> {
        if self.difficulty > MAX_DIFFICULTY {
            return Err(BlockError::UnreachableDifficulty(self.difficulty).into());
        }

        let stride = self.num_workers.max(1) as u64;
        let mut nonce = self.worker_id as u64;
        let mut attempts: u64 = 0;

        while !self.stop_signal.load(Ordering::Relaxed) {
            block.set_nonce(nonce);
            attempts += 1;

            if block.meets_difficulty(self.difficulty) {
                self.stop_signal.store(true, Ordering::Relaxed);
                info!(
                    worker = self.worker_id,
                    nonce,
                    attempts,
                    hash = %block.hash_hex(),
                    "found valid block"
                );
                let solution = MiningSolution {
                    block,
                    worker_id: self.worker_id,
                    attempts,
                };
                // A closed channel just means another worker already won.
                let _ = self.solution_sender.blocking_send(solution);
                return Ok(());
            }

            if attempts % PROGRESS_LOG_INTERVAL == 0 {
                debug!(worker = self.worker_id, attempts, "still searching");
            }

            nonce = nonce.wrapping_add(stride);
        }

        debug!(worker = self.worker_id, attempts, "stopped without a solution");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> Block {
        Block::new(1, [0u8; 32], 1_700_000_000, "test".to_string())
    }

    #[tokio::test]
    async fn test_worker_finds_solution() {
        let (tx, mut rx) = mpsc::channel(1);
        let stop_signal = Arc::new(AtomicBool::new(false));
        let worker = MiningWorker::new(Arc::clone(&stop_signal), tx, 0, 1, 0);

        let handle = tokio::task::spawn_blocking(move || worker.mine(candidate()));

        let solution = rx.recv().await.unwrap();
        assert!(solution.block.meets_difficulty(0));
        assert!(solution.block.is_hash_valid());
        assert_eq!(solution.worker_id, 0);
        assert!(stop_signal.load(Ordering::Relaxed));

        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_stop_signal_halts_worker() {
        let (tx, mut rx) = mpsc::channel(1);
        let stop_signal = Arc::new(AtomicBool::new(true));
        let worker = MiningWorker::new(Arc::clone(&stop_signal), tx, 0, 1, MAX_DIFFICULTY);

        let handle = tokio::task::spawn_blocking(move || worker.mine(candidate()));
        handle.await.unwrap().unwrap();

        // The worker exited without sending anything.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_worker_strides_from_its_id() {
        let (tx, mut rx) = mpsc::channel(1);
        let stop_signal = Arc::new(AtomicBool::new(false));
        let worker = MiningWorker::new(Arc::clone(&stop_signal), tx, 3, 4, 0);

        tokio::task::spawn_blocking(move || worker.mine(candidate()))
            .await
            .unwrap()
            .unwrap();

        let solution = rx.recv().await.unwrap();
        assert_eq!(solution.block.nonce % 4, 3);
    }

    #[tokio::test]
    async fn test_worker_rejects_unreachable_difficulty() {
        let (tx, _rx) = mpsc::channel(1);
        let stop_signal = Arc::new(AtomicBool::new(false));
        let worker = MiningWorker::new(stop_signal, tx, 0, 1, MAX_DIFFICULTY + 1);

        let result = tokio::task::spawn_blocking(move || worker.mine(candidate()))
            .await
            .unwrap();
        assert!(matches!(result, Err(MinerError::Block(_))));
    }
}
