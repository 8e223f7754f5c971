#![warn(missing_docs)]

//! Sediment: embedded key-value store with frequency-tiered compression
//!
//! Hot entries are held uncompressed for low-latency reads; cold entries
//! migrate into progressively stronger compression tiers (LZ4 through Zstd
//! level 19) to reclaim space.
//!
//! Write path: Value → Route by size (chunking threshold) → Encode at the
//! cold tier → Blob store or per-chunk files (+ write buffer when lazy)
//! Read path:  Store → Decode per recorded algorithm → Value (+ access
//! counter and heat bump, which may arm the reorganization trigger)
//!
//! Values below the chunking threshold live in the blob store as single
//! encoded records; larger blobs are split into fixed-size chunks, each
//! independently encoded and independently heated, supporting partial-range
//! reads. Every stored byte carries a recoverable `(algorithm,
//! original_size)` pair in its descriptor, so reorganization can always
//! decode under the old algorithm and re-encode under the new one.
//!
//! The engine is single-threaded cooperative: one owning caller, no
//! internal parallelism, and all automatic maintenance (heat decay,
//! reorganization, cold eviction) runs synchronously at the end of public
//! operations.

pub mod blob;
pub mod buffer;
pub mod chunk;
pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod meta;
pub mod stats;
pub mod tiering;

mod record;

pub use chunk::{ChunkManifest, ChunkMeta};
pub use codec::{Algorithm, CodecOverride, CodecSet};
pub use config::{Config, HeatDecayStrategy, ReorgStrategy, TierSlot};
pub use engine::Database;
pub use error::{Result, SedimentError};
pub use meta::EntryMeta;
pub use stats::Stats;
pub use tiering::Tier;
