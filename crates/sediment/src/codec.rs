//! LZ4 and Zstd codecs plus the per-tier encode/decode dispatcher.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, SedimentError};
use crate::tiering::Tier;

/// Compression algorithm selection.
///
/// The discriminants are the stable on-disk byte tags; never reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum Algorithm {
    /// No compression (passthrough).
    #[default]
    None = 0,
    /// LZ4 block format, default level.
    Lz4Fast = 1,
    /// LZ4 high-compression slot. The pure-Rust encoder has a single level,
    /// so this currently shares the block encoder; the tag stays distinct
    /// because decoding is level-independent.
    Lz4High = 2,
    /// Zstandard level 3.
    ZstdFast = 3,
    /// Zstandard level 10.
    ZstdMedium = 4,
    /// Zstandard level 19.
    ZstdMax = 5,
}

impl Algorithm {
    /// Stable on-disk byte tag.
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Inverse of [`as_byte`](Self::as_byte).
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::None),
            1 => Some(Self::Lz4Fast),
            2 => Some(Self::Lz4High),
            3 => Some(Self::ZstdFast),
            4 => Some(Self::ZstdMedium),
            5 => Some(Self::ZstdMax),
            _ => None,
        }
    }

    fn zstd_level(self) -> i32 {
        match self {
            Self::ZstdFast => 3,
            Self::ZstdMedium => 10,
            Self::ZstdMax => 19,
            _ => 0,
        }
    }
}

/// Encode `data` with the given algorithm.
pub fn encode(data: &[u8], algo: Algorithm) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    match algo {
        Algorithm::None => Ok(data.to_vec()),
        Algorithm::Lz4Fast | Algorithm::Lz4High => Ok(lz4_flex::block::compress(data)),
        Algorithm::ZstdFast | Algorithm::ZstdMedium | Algorithm::ZstdMax => {
            zstd::bulk::compress(data, algo.zstd_level()).map_err(|e| {
                SedimentError::EncodeFailed {
                    algorithm: algo,
                    reason: e.to_string(),
                }
            })
        }
    }
}

/// Decode `data` that was encoded with `algo`. Must produce exactly
/// `original_size` bytes or fail.
pub fn decode(data: &[u8], algo: Algorithm, original_size: usize) -> Result<Vec<u8>> {
    if original_size == 0 {
        return Ok(Vec::new());
    }
    let out = match algo {
        Algorithm::None => data.to_vec(),
        Algorithm::Lz4Fast | Algorithm::Lz4High => {
            lz4_flex::block::decompress(data, original_size).map_err(|e| {
                SedimentError::DecodeFailed {
                    algorithm: algo,
                    reason: e.to_string(),
                }
            })?
        }
        Algorithm::ZstdFast | Algorithm::ZstdMedium | Algorithm::ZstdMax => {
            zstd::bulk::decompress(data, original_size).map_err(|e| {
                SedimentError::DecodeFailed {
                    algorithm: algo,
                    reason: e.to_string(),
                }
            })?
        }
    };
    if out.len() != original_size {
        return Err(SedimentError::DecodeFailed {
            algorithm: algo,
            reason: format!("expected {} bytes, got {}", original_size, out.len()),
        });
    }
    Ok(out)
}

/// User-supplied encode callable: plain bytes in, encoded bytes out.
pub type EncodeFn = Arc<dyn Fn(&[u8]) -> std::result::Result<Vec<u8>, String> + Send + Sync>;

/// User-supplied decode callable: encoded bytes and original size in,
/// plain bytes out.
pub type DecodeFn =
    Arc<dyn Fn(&[u8], usize) -> std::result::Result<Vec<u8>, String> + Send + Sync>;

/// A custom codec pair that overrides the registry entry for one tier.
///
/// The tier's descriptor still records the built-in algorithm tag, so the
/// on-disk format stays stable. A store written with an override must be
/// reopened with the same override installed.
#[derive(Clone)]
pub struct CodecOverride {
    /// Replacement for the built-in encoder.
    pub encode: EncodeFn,
    /// Replacement for the built-in decoder.
    pub decode: DecodeFn,
}

impl fmt::Debug for CodecOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CodecOverride")
    }
}

#[derive(Clone, Debug)]
struct SlotCodec {
    algorithm: Algorithm,
    custom: Option<CodecOverride>,
}

/// Resolved per-tier codec table: the compression dispatcher.
///
/// Built once from the configuration; stateless and cheap to clone.
#[derive(Clone, Debug)]
pub struct CodecSet {
    slots: [SlotCodec; 5],
}

impl CodecSet {
    /// Build the dispatcher from five `(algorithm, override)` slots.
    /// With compression disabled, pass `Algorithm::None` in every slot.
    pub fn new(slots: [(Algorithm, Option<CodecOverride>); 5]) -> Self {
        Self {
            slots: slots.map(|(algorithm, custom)| SlotCodec { algorithm, custom }),
        }
    }

    /// The algorithm a given tier encodes with.
    pub fn algorithm_for_tier(&self, tier: Tier) -> Algorithm {
        self.slots[tier.index()].algorithm
    }

    /// Encode `data` for `tier`, returning the bytes and the algorithm tag
    /// recorded in the descriptor. Encode failures downgrade to a NONE
    /// passthrough rather than losing data.
    pub fn encode_for_tier(&self, tier: Tier, data: &[u8]) -> (Vec<u8>, Algorithm) {
        let slot = &self.slots[tier.index()];
        let attempt = match &slot.custom {
            Some(custom) => (custom.encode)(data).map_err(|reason| SedimentError::EncodeFailed {
                algorithm: slot.algorithm,
                reason,
            }),
            None => encode(data, slot.algorithm),
        };
        match attempt {
            Ok(encoded) => (encoded, slot.algorithm),
            Err(e) => {
                warn!(tier = ?tier, error = %e, "encode failed, storing uncompressed");
                (data.to_vec(), Algorithm::None)
            }
        }
    }

    /// Decode bytes recorded with `(tier, algorithm)`. The tier's custom
    /// decoder applies only while its slot still carries the same built-in
    /// tag the bytes were recorded under.
    pub fn decode(
        &self,
        tier: Tier,
        algorithm: Algorithm,
        data: &[u8],
        original_size: usize,
    ) -> Result<Vec<u8>> {
        let slot = &self.slots[tier.index()];
        if let Some(custom) = &slot.custom {
            if slot.algorithm == algorithm {
                let out = (custom.decode)(data, original_size).map_err(|reason| {
                    SedimentError::DecodeFailed { algorithm, reason }
                })?;
                if out.len() != original_size {
                    return Err(SedimentError::DecodeFailed {
                        algorithm,
                        reason: format!("expected {} bytes, got {}", original_size, out.len()),
                    });
                }
                return Ok(out);
            }
        }
        decode(data, algorithm, original_size)
    }
}
