//! Engine statistics snapshot.

use serde::{Deserialize, Serialize};

/// Point-in-time view of the engine's contents and counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Non-chunked entry count per tier, hottest first.
    pub tier_counts: [u64; 5],
    /// Sum of encoded sizes across non-chunked entries.
    pub total_size: u64,
    /// Sum of original sizes across non-chunked entries.
    pub original_total_size: u64,
    /// All successful non-chunked reads since creation.
    pub total_accesses: u64,
    /// Operations since the last reorganization pass.
    pub operations_since_reorg: u64,
    /// Number of chunked blobs.
    pub chunked_blobs: u64,
    /// Encoded bytes across all chunk files.
    pub chunk_storage_bytes: u64,
}

impl Stats {
    /// Total non-chunked entries.
    pub fn entry_count(&self) -> u64 {
        self.tier_counts.iter().sum()
    }

    /// Original over encoded size; 1.0 when nothing is stored.
    pub fn compression_ratio(&self) -> f64 {
        if self.total_size > 0 {
            self.original_total_size as f64 / self.total_size as f64
        } else {
            1.0
        }
    }

    /// Bytes saved by compression (negative when encoding expanded data).
    pub fn bytes_saved(&self) -> i64 {
        self.original_total_size as i64 - self.total_size as i64
    }
}
