//! Block time and deterministic identifiers
//!
//! The module never reads the wall clock. Every timestamp comes from the
//! host's block header, and every identifier is derived from the block hash,
//! the height and an intra-block counter, so all replicas replaying the same
//! block produce the same ids.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Header of the block currently being executed by the host
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Block height
    pub height: u64,

    /// Consensus block time
    pub time: DateTime<Utc>,

    /// Block hash
    pub hash: [u8; 32],
}

impl BlockHeader {
    pub fn new(height: u64, time: DateTime<Utc>, hash: [u8; 32]) -> Self {
        Self { height, time, hash }
    }

    /// First block of a test or replay chain
    pub fn genesis(time: DateTime<Utc>) -> Self {
        let hash = blake3::hash(&time.timestamp().to_be_bytes());
        Self::new(1, time, *hash.as_bytes())
    }

    /// Header of the following block, `block_time` later
    pub fn next(&self, block_time: Duration) -> Self {
        let height = self.height + 1;
        let mut input = self.hash.to_vec();
        input.extend_from_slice(&height.to_be_bytes());
        Self::new(height, self.time + block_time, *blake3::hash(&input).as_bytes())
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }
}

/// Deterministic, collision-resistant id source for one block
///
/// id = UUIDv4-shaped(BLAKE3(block_hash || height || counter || domain))
#[derive(Clone, Debug)]
pub struct IdGenerator {
    block_hash: [u8; 32],
    height: u64,
    counter: u64,
}

impl IdGenerator {
    /// Start a fresh counter for the given block
    pub fn for_block(header: &BlockHeader) -> Self {
        Self {
            block_hash: header.hash,
            height: header.height,
            counter: 0,
        }
    }

    /// Allocate the next id in `domain` (e.g. "bridge", "transfer")
    pub fn next_id(&mut self, domain: &str) -> String {
        self.counter += 1;

        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.block_hash);
        hasher.update(&self.height.to_be_bytes());
        hasher.update(&self.counter.to_be_bytes());
        hasher.update(domain.as_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest.as_bytes()[..16]);
        uuid::Builder::from_random_bytes(bytes)
            .into_uuid()
            .to_string()
    }

    /// Number of ids handed out in this block so far
    pub fn issued(&self) -> u64 {
        self.counter
    }
}
