use crate::error::BlockError;
use crate::hash::{hash256, hash_to_hex, leading_zero_nibbles, Hash256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A SHA-256 hash renders as 64 hex digits, so no hash can begin with more
/// leading zero digits than that.
pub const MAX_DIFFICULTY: u8 = 64;

/// Payload carried by the genesis block.
pub const GENESIS_DATA: &str = "GenesisBlock";

/// Block structure representing one link of the hash chain.
///
/// The stored `hash` covers every other field, so changing any of them
/// without recomputing it is detectable by [`Block::is_hash_valid`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    /// Position of this block in the chain (genesis is 0)
    pub height: u64,

    /// Hash of the previous block
    pub prev_hash: Hash256,

    /// Timestamp of the block (seconds since Unix epoch)
    pub timestamp: u64,

    /// Opaque payload stored in the block
    pub data: String,

    /// Nonce used for proof of work
    pub nonce: u64,

    /// Hash of all fields above
    pub hash: Hash256,
}

impl Block {
    /// Create a new block with nonce 0 and its hash already computed.
    pub fn new(height: u64, prev_hash: Hash256, timestamp: u64, data: String) -> Self {
        let mut block = Self {
            height,
            prev_hash,
            timestamp,
            data,
            nonce: 0,
            hash: [0u8; 32],
        };
        block.hash = block.compute_hash();
        block
    }

    /// Create the genesis block, timestamped at the current time.
    pub fn genesis() -> Self {
        Self::new(0, [0u8; 32], current_timestamp(), GENESIS_DATA.to_string())
    }

    /// Serialize the hashed fields into a deterministic preimage.
    fn serialize_for_hash(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(8 + 32 + 8 + self.data.len() + 8);

        // Height (Little Endian)
        buffer.extend_from_slice(&self.height.to_le_bytes());
        // Previous block hash
        buffer.extend_from_slice(&self.prev_hash);
        // Timestamp (Little Endian)
        buffer.extend_from_slice(&self.timestamp.to_le_bytes());
        // Payload bytes
        buffer.extend_from_slice(self.data.as_bytes());
        // Nonce (Little Endian)
        buffer.extend_from_slice(&self.nonce.to_le_bytes());

        buffer
    }

    /// Recompute the hash from the current field values.
    pub fn compute_hash(&self) -> Hash256 {
        hash256(&self.serialize_for_hash())
    }

    /// Check that the stored hash matches the field values.
    pub fn is_hash_valid(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// Check if the block hash meets the target difficulty, expressed as the
    /// number of leading zero hex digits the hash must carry.
    pub fn meets_difficulty(&self, difficulty: u8) -> bool {
        leading_zero_nibbles(&self.hash) >= u32::from(difficulty)
    }

    /// Set the nonce and refresh the stored hash.
    pub fn set_nonce(&mut self, nonce: u64) {
        self.nonce = nonce;
        self.hash = self.compute_hash();
    }

    /// Increment the nonce for mining and refresh the stored hash.
    pub fn increment_nonce(&mut self) {
        self.set_nonce(self.nonce.wrapping_add(1));
    }

    /// Sequential proof of work: increment the nonce until the hash meets
    /// the difficulty. Runs inline; the `miner` crate provides the
    /// concurrent equivalent with a shared stop signal.
    pub fn mine(&mut self, difficulty: u8) -> Result<(), BlockError> {
        if difficulty > MAX_DIFFICULTY {
            return Err(BlockError::UnreachableDifficulty(difficulty));
        }

        while !self.meets_difficulty(difficulty) {
            self.increment_nonce();
        }

        tracing::debug!(
            height = self.height,
            nonce = self.nonce,
            hash = %self.hash_hex(),
            "block mined"
        );
        Ok(())
    }

    /// Hexadecimal rendering of the block hash.
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Block {{ height: {}, prev_hash: {}, timestamp: {}, data: {:?}, nonce: {}, hash: {} }}",
            self.height,
            hash_to_hex(&self.prev_hash),
            self.timestamp,
            self.data,
            self.nonce,
            self.hash_hex()
        )
    }
}

/// Seconds since the Unix epoch, saturating to 0 if the clock is before it.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
