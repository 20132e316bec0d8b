//! The blockchain: an in-memory, hash-linked list of mined blocks.

use serde::Serialize;
use tracing::debug;

use crate::error::{BlockError, ChainError};
use crate::types::block::{current_timestamp, Block, MAX_DIFFICULTY};

/// Default number of leading zero hex digits a block hash must carry.
pub const DEFAULT_DIFFICULTY: u8 = 4;

/// A chain of blocks where each block stores the hash of its predecessor.
///
/// The chain always holds at least the genesis block, and the difficulty is
/// fixed for the lifetime of the chain.
#[derive(Debug, Clone, Serialize)]
pub struct Blockchain {
    blocks: Vec<Block>,
    difficulty: u8,
}

impl Blockchain {
    /// Create a chain seeded with a genesis block at the default difficulty.
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::genesis()],
            difficulty: DEFAULT_DIFFICULTY,
        }
    }

    /// Create a chain seeded with a genesis block at the given difficulty.
    pub fn with_difficulty(difficulty: u8) -> Result<Self, BlockError> {
        if difficulty > MAX_DIFFICULTY {
            return Err(BlockError::UnreachableDifficulty(difficulty));
        }
        Ok(Self {
            blocks: vec![Block::genesis()],
            difficulty,
        })
    }

    /// The most recently appended block.
    #[allow(clippy::expect_used)]
    pub fn latest(&self) -> &Block {
        // The constructors seed the genesis block and nothing removes
        // blocks, so the chain is never empty.
        self.blocks
            .last()
            .expect("chain always holds the genesis block")
    }

    /// Height of the chain tip.
    pub fn height(&self) -> u64 {
        self.latest().height
    }

    /// Number of blocks in the chain, genesis included.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false: the constructors seed the genesis block and nothing
    /// removes blocks. Kept so `len` has its conventional `is_empty` pair.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Difficulty every non-genesis block must meet.
    pub fn difficulty(&self) -> u8 {
        self.difficulty
    }

    /// The blocks, genesis first.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Build the next unmined block: linked to the tip, nonce 0.
    pub fn next_candidate(&self, data: String) -> Block {
        let tip = self.latest();
        Block::new(tip.height + 1, tip.hash, current_timestamp(), data)
    }

    /// Mine a block for `data` inline and append it.
    ///
    /// This is the sequential path; the `miner` crate races several workers
    /// over the same candidate instead.
    pub fn add_block(&mut self, data: String) -> Result<&Block, BlockError> {
        let mut block = self.next_candidate(data);
        block.mine(self.difficulty)?;
        debug!(height = block.height, hash = %block.hash_hex(), "appending mined block");
        self.blocks.push(block);
        Ok(self.latest())
    }

    /// Append a block that was mined elsewhere, checking that it extends the
    /// tip, is internally consistent, and meets the chain difficulty.
    pub fn append_mined(&mut self, block: Block) -> Result<(), ChainError> {
        let tip = self.latest();
        if block.height != tip.height + 1 || block.prev_hash != tip.hash {
            return Err(ChainError::NotOnTip {
                height: block.height,
                tip: tip.height,
            });
        }
        if !block.is_hash_valid() {
            return Err(ChainError::HashMismatch {
                height: block.height,
            });
        }
        if !block.meets_difficulty(self.difficulty) {
            return Err(ChainError::DifficultyNotMet {
                height: block.height,
                difficulty: self.difficulty,
            });
        }
        self.blocks.push(block);
        Ok(())
    }

    /// Validate the whole chain: every stored hash matches its block's
    /// contents, heights are consecutive from 0, each block links to its
    /// predecessor's hash, and every non-genesis block meets the chain
    /// difficulty.
    pub fn validate(&self) -> Result<(), ChainError> {
        let Some(genesis) = self.blocks.first() else {
            return Err(ChainError::MissingGenesis);
        };
        if genesis.height != 0 {
            return Err(ChainError::BadHeight {
                position: 0,
                height: genesis.height,
                expected: 0,
            });
        }

        for (position, block) in self.blocks.iter().enumerate() {
            if block.height != position as u64 {
                return Err(ChainError::BadHeight {
                    position,
                    height: block.height,
                    expected: position as u64,
                });
            }
            if !block.is_hash_valid() {
                return Err(ChainError::HashMismatch {
                    height: block.height,
                });
            }
            if position > 0 {
                if block.prev_hash != self.blocks[position - 1].hash {
                    return Err(ChainError::BrokenLink {
                        height: block.height,
                    });
                }
                if !block.meets_difficulty(self.difficulty) {
                    return Err(ChainError::DifficultyNotMet {
                        height: block.height,
                        difficulty: self.difficulty,
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_chain_starts_at_genesis() {
        let chain = Blockchain::new();
        assert_eq!(chain.len(), 1);
        assert!(!chain.is_empty());
        assert_eq!(chain.height(), 0);
        assert_eq!(chain.difficulty(), DEFAULT_DIFFICULTY);
        assert!(chain.validate().is_ok());
    }

    #[test]
    fn test_rejects_unreachable_difficulty() {
        assert!(matches!(
            Blockchain::with_difficulty(MAX_DIFFICULTY + 1),
            Err(BlockError::UnreachableDifficulty(65))
        ));
    }

    #[test]
    fn test_add_block_links_and_validates() {
        let mut chain = Blockchain::with_difficulty(1).unwrap();
        chain.add_block("first".to_string()).unwrap();
        chain.add_block("second".to_string()).unwrap();

        assert_eq!(chain.height(), 2);
        assert_eq!(chain.blocks()[1].prev_hash, chain.blocks()[0].hash);
        assert_eq!(chain.blocks()[2].prev_hash, chain.blocks()[1].hash);
        assert!(chain.validate().is_ok());
    }

    #[test]
    fn test_tampering_breaks_validation() {
        let mut chain = Blockchain::with_difficulty(1).unwrap();
        chain.add_block("first".to_string()).unwrap();
        chain.add_block("second".to_string()).unwrap();

        let mut tampered = chain.clone();
        tampered.blocks[1].data = "rewritten history".to_string();
        assert_eq!(
            tampered.validate(),
            Err(ChainError::HashMismatch { height: 1 })
        );
    }

    #[test]
    fn test_relinked_tampering_still_detected() {
        let mut chain = Blockchain::with_difficulty(0).unwrap();
        chain.add_block("first".to_string()).unwrap();
        chain.add_block("second".to_string()).unwrap();

        // Rewrite block 1 and recompute its hash; block 2 still points at
        // the old hash, so the link check must fire.
        chain.blocks[1].data = "rewritten history".to_string();
        chain.blocks[1].hash = chain.blocks[1].compute_hash();
        assert_eq!(chain.validate(), Err(ChainError::BrokenLink { height: 2 }));
    }

    #[test]
    fn test_append_mined_rejects_stale_candidate() {
        let mut chain = Blockchain::with_difficulty(0).unwrap();
        let stale = chain.next_candidate("stale".to_string());
        chain.add_block("winner".to_string()).unwrap();

        assert_eq!(
            chain.append_mined(stale),
            Err(ChainError::NotOnTip { height: 1, tip: 1 })
        );
    }

    #[test]
    fn test_append_mined_rejects_unmined_block() {
        let mut chain = Blockchain::with_difficulty(4).unwrap();
        let candidate = chain.next_candidate("no work done".to_string());
        // Overwhelmingly likely that an unmined hash misses difficulty 4;
        // skip the assertion in the rare case it does not.
        if !candidate.meets_difficulty(4) {
            assert_eq!(
                chain.append_mined(candidate),
                Err(ChainError::DifficultyNotMet {
                    height: 1,
                    difficulty: 4
                })
            );
        }
    }

    #[test]
    fn test_append_mined_accepts_solved_candidate() {
        let mut chain = Blockchain::with_difficulty(1).unwrap();
        let mut candidate = chain.next_candidate("solved".to_string());
        candidate.mine(1).unwrap();
        chain.append_mined(candidate).unwrap();
        assert_eq!(chain.height(), 1);
        assert!(chain.validate().is_ok());
    }

    #[test]
    fn test_chain_serializes_to_json() {
        let chain = Blockchain::with_difficulty(0).unwrap();
        let json = serde_json::to_value(&chain).unwrap();
        assert_eq!(json["difficulty"], 0);
        assert_eq!(json["blocks"][0]["height"], 0);
    }
}
