//! Engine configuration and workload presets.

use serde::{Deserialize, Serialize};

use crate::codec::{Algorithm, CodecOverride, CodecSet};
use crate::tiering::DecayRule;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;

/// When to trigger a reorganization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum ReorgStrategy {
    /// Only on explicit [`reorganize`](crate::Database::reorganize) calls.
    Manual = 0,
    /// After `reorg_op_threshold` operations.
    EveryNOps = 1,
    /// Every `reorg_time_threshold` seconds.
    Periodic = 2,
    /// When operations since the last pass outpace the entry count by
    /// `reorg_change_threshold`.
    #[default]
    Adaptive = 3,
}

impl ReorgStrategy {
    /// Stable byte tag.
    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}

/// How heat cools between accesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum HeatDecayStrategy {
    /// No decay; cumulative counts only.
    #[default]
    None = 0,
    /// `heat *= heat_decay_factor` per pass.
    Exponential = 1,
    /// `heat -= heat_decay_amount` per pass.
    Linear = 2,
    /// Exponential in elapsed time since last access.
    TimeBased = 3,
}

impl HeatDecayStrategy {
    /// Stable byte tag.
    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}

/// Configuration for one compression tier.
#[derive(Clone, Serialize, Deserialize)]
pub struct TierSlot {
    /// Built-in algorithm for this tier; also the on-disk tag recorded for
    /// entries encoded here, even when a custom codec is installed.
    pub algorithm: Algorithm,
    /// Reserved: permit lossy codecs on this tier. No built-in lossy codec
    /// ships; the flag gates future custom codecs.
    pub allow_lossy: bool,
    /// Custom codec pair overriding the registry for this tier.
    #[serde(skip)]
    pub codec: Option<CodecOverride>,
}

impl TierSlot {
    /// Slot using a built-in algorithm, lossless, no override.
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            allow_lossy: false,
            codec: None,
        }
    }

    /// Install a custom codec pair for this tier.
    pub fn with_codec(mut self, codec: CodecOverride) -> Self {
        self.codec = Some(codec);
        self
    }
}

impl std::fmt::Debug for TierSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TierSlot")
            .field("algorithm", &self.algorithm)
            .field("allow_lossy", &self.allow_lossy)
            .field("codec", &self.codec.as_ref().map(|_| "custom"))
            .finish()
    }
}

impl Default for TierSlot {
    fn default() -> Self {
        Self::new(Algorithm::None)
    }
}

/// Engine configuration. Presets are pure factories over this schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Permit cold eviction when the size limit is exceeded.
    pub allow_deletion: bool,
    /// Size cap driving the eviction check.
    pub max_size_bytes: u64,
    /// Master switch; when off, everything is stored as a NONE passthrough.
    pub compression_enabled: bool,
    /// Per-tier codec configuration, hottest first.
    pub tiers: [TierSlot; 5],

    /// When reorganization passes fire.
    pub reorg_strategy: ReorgStrategy,
    /// EVERY_N_OPS: operations between passes.
    pub reorg_op_threshold: u64,
    /// PERIODIC: seconds between passes.
    pub reorg_time_threshold: u64,
    /// ADAPTIVE: ops-per-entry ratio that arms the trigger.
    pub reorg_change_threshold: f64,

    /// Stage inserts in the write buffer instead of the blob store.
    pub lazy_persistence: bool,
    /// Buffered-bytes watermark that forces a flush.
    pub write_buffer_size: u64,

    /// Split blobs of `chunking_threshold` bytes and larger into chunks.
    pub enable_chunking: bool,
    /// Minimum blob size routed through the chunking engine.
    pub chunking_threshold: u64,
    /// Slice size for chunked blobs.
    pub chunk_size: u64,

    /// Switch the tier controller from frequency mode to heat mode and
    /// arm the periodic decay pass.
    pub enable_heat_decay: bool,
    /// How heat cools between decay passes.
    pub heat_decay_strategy: HeatDecayStrategy,
    /// EXPONENTIAL / TIME_BASED multiplier, in `(0, 1)`.
    pub heat_decay_factor: f64,
    /// LINEAR subtraction per pass.
    pub heat_decay_amount: f64,
    /// Seconds between decay passes (and the TIME_BASED period).
    pub heat_decay_interval: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allow_deletion: false,
            max_size_bytes: u64::MAX,
            compression_enabled: true,
            tiers: [
                TierSlot::new(Algorithm::None),
                TierSlot::new(Algorithm::Lz4Fast),
                TierSlot::new(Algorithm::Lz4High),
                TierSlot::new(Algorithm::ZstdMedium),
                TierSlot::new(Algorithm::ZstdMax),
            ],
            reorg_strategy: ReorgStrategy::Adaptive,
            reorg_op_threshold: 100,
            reorg_time_threshold: 300,
            reorg_change_threshold: 0.2,
            lazy_persistence: false,
            write_buffer_size: 10 * MIB,
            enable_chunking: false,
            chunking_threshold: MIB,
            chunk_size: 4 * MIB,
            enable_heat_decay: false,
            heat_decay_strategy: HeatDecayStrategy::None,
            heat_decay_factor: 0.95,
            heat_decay_amount: 0.05,
            heat_decay_interval: 60,
        }
    }
}

impl Config {
    /// Image stores: hot tiers uncompressed, moderate compression for cold
    /// data that is usually already in a compressed format.
    pub fn for_images() -> Self {
        Self {
            allow_deletion: true,
            max_size_bytes: 10 * GIB,
            reorg_strategy: ReorgStrategy::EveryNOps,
            reorg_op_threshold: 500,
            lazy_persistence: true,
            tiers: [
                TierSlot::new(Algorithm::None),
                TierSlot::new(Algorithm::None),
                TierSlot::new(Algorithm::Lz4Fast),
                TierSlot::new(Algorithm::ZstdFast),
                TierSlot::new(Algorithm::ZstdMedium),
            ],
            ..Self::default()
        }
    }

    /// Video stores: payloads are already compressed, so only light LZ4 on
    /// the coldest tiers.
    pub fn for_videos() -> Self {
        Self {
            allow_deletion: true,
            max_size_bytes: 100 * GIB,
            reorg_strategy: ReorgStrategy::Periodic,
            reorg_time_threshold: 3600,
            lazy_persistence: true,
            tiers: [
                TierSlot::new(Algorithm::None),
                TierSlot::new(Algorithm::None),
                TierSlot::new(Algorithm::None),
                TierSlot::new(Algorithm::Lz4Fast),
                TierSlot::new(Algorithm::Lz4Fast),
            ],
            ..Self::default()
        }
    }

    /// Text and logs: compress aggressively, persist eagerly.
    pub fn for_text() -> Self {
        Self {
            allow_deletion: false,
            max_size_bytes: u64::MAX,
            reorg_strategy: ReorgStrategy::Adaptive,
            lazy_persistence: false,
            ..Self::default()
        }
    }

    /// Embedded targets: small cap, fast codecs only, frugal buffering.
    pub fn for_embedded() -> Self {
        Self {
            allow_deletion: true,
            max_size_bytes: 64 * MIB,
            reorg_strategy: ReorgStrategy::EveryNOps,
            reorg_op_threshold: 200,
            write_buffer_size: 256 * KIB,
            tiers: [
                TierSlot::new(Algorithm::None),
                TierSlot::new(Algorithm::Lz4Fast),
                TierSlot::new(Algorithm::Lz4Fast),
                TierSlot::new(Algorithm::ZstdFast),
                TierSlot::new(Algorithm::ZstdFast),
            ],
            ..Self::default()
        }
    }

    /// CCTV footage: chunked segments with time-based cooling, so recent
    /// footage stays cheap to scrub while old footage compacts.
    pub fn for_cctv() -> Self {
        Self {
            allow_deletion: true,
            max_size_bytes: 100 * GIB,
            reorg_strategy: ReorgStrategy::Periodic,
            reorg_time_threshold: 3600,
            lazy_persistence: true,
            enable_chunking: true,
            chunking_threshold: MIB,
            chunk_size: 4 * MIB,
            enable_heat_decay: true,
            heat_decay_strategy: HeatDecayStrategy::TimeBased,
            heat_decay_factor: 0.9,
            heat_decay_interval: 3600,
            tiers: [
                TierSlot::new(Algorithm::None),
                TierSlot::new(Algorithm::None),
                TierSlot::new(Algorithm::Lz4Fast),
                TierSlot::new(Algorithm::Lz4Fast),
                TierSlot::new(Algorithm::ZstdFast),
            ],
            ..Self::default()
        }
    }

    /// Resolve the per-tier codec table. With compression disabled every
    /// tier becomes a NONE passthrough, and descriptors record NONE so the
    /// flag can be flipped later without misdecoding.
    pub fn codec_set(&self) -> CodecSet {
        CodecSet::new(self.tiers.clone().map(|slot| {
            if self.compression_enabled {
                (slot.algorithm, slot.codec)
            } else {
                (Algorithm::None, None)
            }
        }))
    }

    /// Resolve the decay strategy and its parameters.
    pub fn decay_rule(&self) -> DecayRule {
        if !self.enable_heat_decay {
            return DecayRule::None;
        }
        match self.heat_decay_strategy {
            HeatDecayStrategy::None => DecayRule::None,
            HeatDecayStrategy::Exponential => DecayRule::Exponential {
                factor: self.heat_decay_factor,
            },
            HeatDecayStrategy::Linear => DecayRule::Linear {
                amount: self.heat_decay_amount,
            },
            HeatDecayStrategy::TimeBased => DecayRule::TimeBased {
                factor: self.heat_decay_factor,
                interval_secs: self.heat_decay_interval,
            },
        }
    }
}
