//! Chunked-blob storage: fixed-size, independently encoded and
//! independently heated chunks with per-blob manifests.
//!
//! Layout under the engine root:
//! `chunks/<key>/chunk_NNN.bin` (one file per chunk) plus the sidecar
//! manifest `chunks/chunk_metadata.db`.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::codec::{Algorithm, CodecSet};
use crate::error::{Result, SedimentError};
use crate::record;
use crate::tiering::{self, DecayRule, Tier, HEAT_READ_STEP, INITIAL_HEAT};

const MANIFEST_FILE: &str = "chunk_metadata.db";

/// Descriptor for one chunk of a chunked blob.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChunkMeta {
    /// Chunk length before encoding. Equal to the blob's chunk size for all
    /// but the final chunk.
    pub original_size: u64,
    /// Chunk file length on disk.
    pub encoded_size: u64,
    /// Tier this chunk was last organized into.
    pub tier: Tier,
    /// Algorithm the chunk file is currently encoded with.
    pub algorithm: Algorithm,
    /// Per-chunk access score in `[0, 1]`.
    pub heat: f64,
    /// Epoch seconds of the last read touching this chunk.
    pub last_access: u64,
}

/// Per-blob manifest: how a blob was split and where each chunk stands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkManifest {
    /// Blob identifier; also the chunk directory name.
    pub key: String,
    /// Blob length before chunking.
    pub total_size: u64,
    /// Slice size the blob was split at.
    pub chunk_size: u64,
    /// `ceil(total_size / chunk_size)`.
    pub num_chunks: u32,
    /// Indexed by chunk id.
    pub chunks: Vec<ChunkMeta>,
}

/// The chunking engine: manifests in memory, chunk files on disk.
#[derive(Debug)]
pub struct ChunkStore {
    root: PathBuf,
    manifests: BTreeMap<String, ChunkManifest>,
}

fn chunk_file_path(root: &Path, key: &str, index: u32) -> PathBuf {
    // Zero-padded to three digits; wider indices grow naturally and readers
    // always resolve names through the manifest.
    root.join(key).join(format!("chunk_{index:03}.bin"))
}

impl ChunkStore {
    /// Open the chunk store rooted at `<engine>/chunks`, creating the
    /// directory and loading any existing manifest.
    pub fn open(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root)?;
        let mut store = Self {
            root,
            manifests: BTreeMap::new(),
        };
        store.load_manifests()?;
        Ok(store)
    }

    /// Whether a blob is stored here.
    pub fn contains(&self, key: &str) -> bool {
        self.manifests.contains_key(key)
    }

    /// Manifest for a blob.
    pub fn manifest(&self, key: &str) -> Option<&ChunkManifest> {
        self.manifests.get(key)
    }

    /// Number of chunked blobs.
    pub fn blob_count(&self) -> usize {
        self.manifests.len()
    }

    /// Total encoded bytes across all chunk files.
    pub fn storage_bytes(&self) -> u64 {
        self.manifests
            .values()
            .flat_map(|m| m.chunks.iter())
            .map(|c| c.encoded_size)
            .sum()
    }

    /// Split `data` into `chunk_size` slices, encode each at the cold tier,
    /// and write one file per chunk. Replaces any existing blob under `key`.
    pub fn insert(
        &mut self,
        key: &str,
        data: &[u8],
        chunk_size: u64,
        codecs: &CodecSet,
        now: u64,
    ) -> Result<()> {
        debug_assert!(chunk_size > 0 && !data.is_empty());
        if self.manifests.contains_key(key) {
            self.remove(key)?;
        }

        let num_chunks = data.len().div_ceil(chunk_size as usize) as u32;
        let dir = self.root.join(key);
        fs::create_dir_all(&dir)?;

        let mut manifest = ChunkManifest {
            key: key.to_string(),
            total_size: data.len() as u64,
            chunk_size,
            num_chunks,
            chunks: Vec::with_capacity(num_chunks as usize),
        };

        for i in 0..num_chunks {
            let offset = i as usize * chunk_size as usize;
            let end = (offset + chunk_size as usize).min(data.len());
            let slice = &data[offset..end];

            let (encoded, algorithm) = codecs.encode_for_tier(Tier::T4, slice);
            fs::write(chunk_file_path(&self.root, key, i), &encoded)?;

            manifest.chunks.push(ChunkMeta {
                original_size: slice.len() as u64,
                encoded_size: encoded.len() as u64,
                tier: Tier::T4,
                algorithm,
                heat: INITIAL_HEAT,
                last_access: now,
            });
        }

        debug!(key, num_chunks, total = data.len(), "chunked blob inserted");
        self.manifests.insert(key.to_string(), manifest);
        self.save_manifests()
    }

    /// Read and decode chunks `start..=end`, bumping each chunk's heat and
    /// last-access. Absent key yields `None`; a bad range is an error.
    pub fn get_range(
        &mut self,
        key: &str,
        start: u32,
        end: u32,
        codecs: &CodecSet,
        now: u64,
    ) -> Result<Option<Vec<u8>>> {
        let Some(manifest) = self.manifests.get_mut(key) else {
            return Ok(None);
        };
        if start > end || end >= manifest.num_chunks {
            return Err(SedimentError::RangeInvalid {
                start,
                end,
                num_chunks: manifest.num_chunks,
            });
        }

        let capacity: u64 = manifest.chunks[start as usize..=end as usize]
            .iter()
            .map(|c| c.original_size)
            .sum();
        let mut out = Vec::with_capacity(capacity as usize);

        for i in start..=end {
            let chunk = &mut manifest.chunks[i as usize];
            let encoded = fs::read(chunk_file_path(&self.root, key, i))?;
            let decoded = codecs.decode(
                chunk.tier,
                chunk.algorithm,
                &encoded,
                chunk.original_size as usize,
            )?;
            out.extend_from_slice(&decoded);

            chunk.heat = tiering::bump_heat(chunk.heat, HEAT_READ_STEP);
            chunk.last_access = now;
        }

        trace!(key, start, end, bytes = out.len(), "chunk range read");
        Ok(Some(out))
    }

    /// Bump one chunk's heat by an arbitrary step (used by external layers
    /// such as secondary-index range walks).
    pub fn touch_chunk(&mut self, key: &str, index: u32, step: f64, now: u64) -> bool {
        let Some(manifest) = self.manifests.get_mut(key) else {
            return false;
        };
        let Some(chunk) = manifest.chunks.get_mut(index as usize) else {
            return false;
        };
        chunk.heat = tiering::bump_heat(chunk.heat, step);
        chunk.last_access = now;
        true
    }

    /// Delete the blob's chunk directory and manifest entry.
    pub fn remove(&mut self, key: &str) -> Result<bool> {
        if self.manifests.remove(key).is_none() {
            return Ok(false);
        }
        match fs::remove_dir_all(self.root.join(key)) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.save_manifests()?;
        debug!(key, "chunked blob removed");
        Ok(true)
    }

    /// Decay every chunk's heat and retier chunks whose heat crossed a
    /// boundary, re-encoding them under the new tier's algorithm. A chunk
    /// that fails to decode keeps its bytes and encoding; the pass
    /// continues. Returns the number of retiered chunks.
    pub fn apply_decay(&mut self, rule: DecayRule, codecs: &CodecSet, now: u64) -> Result<usize> {
        let mut retiered = 0usize;
        for (key, manifest) in self.manifests.iter_mut() {
            for (i, chunk) in manifest.chunks.iter_mut().enumerate() {
                chunk.heat = rule.apply(chunk.heat, now, chunk.last_access);
                let new_tier = tiering::tier_for_heat(chunk.heat);
                if new_tier == chunk.tier {
                    continue;
                }
                let old_tier = chunk.tier;
                chunk.tier = new_tier;
                retiered += 1;

                let path = chunk_file_path(&self.root, key, i as u32);
                let new_algo = codecs.algorithm_for_tier(new_tier);
                if new_algo == chunk.algorithm {
                    continue;
                }
                let encoded = match fs::read(&path) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!(key = %key, chunk = i, error = %e, "chunk unreadable, keeping encoding");
                        continue;
                    }
                };
                let decoded = match codecs.decode(
                    old_tier,
                    chunk.algorithm,
                    &encoded,
                    chunk.original_size as usize,
                ) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!(key = %key, chunk = i, error = %e, "chunk decode failed, keeping encoding");
                        continue;
                    }
                };
                let (reencoded, algorithm) = codecs.encode_for_tier(new_tier, &decoded);
                if let Err(e) = fs::write(&path, &reencoded) {
                    warn!(key = %key, chunk = i, error = %e, "chunk rewrite failed, keeping encoding");
                    continue;
                }
                chunk.algorithm = algorithm;
                chunk.encoded_size = reencoded.len() as u64;
                trace!(key = %key, chunk = i, ?old_tier, ?new_tier, "chunk retiered");
            }
        }
        Ok(retiered)
    }

    /// Rewrite `chunks/chunk_metadata.db` in full.
    pub fn save_manifests(&self) -> Result<()> {
        let path = self.root.join(MANIFEST_FILE);
        let mut w = BufWriter::new(File::create(&path)?);
        record::write_u32(&mut w, self.manifests.len() as u32)?;
        for manifest in self.manifests.values() {
            record::write_str(&mut w, &manifest.key)?;
            record::write_u64(&mut w, manifest.total_size)?;
            record::write_u64(&mut w, manifest.chunk_size)?;
            record::write_u32(&mut w, manifest.num_chunks)?;
            record::write_u32(&mut w, manifest.chunks.len() as u32)?;
            for chunk in &manifest.chunks {
                record::write_u64(&mut w, chunk.original_size)?;
                record::write_u64(&mut w, chunk.encoded_size)?;
                record::write_u8(&mut w, chunk.tier.as_byte())?;
                record::write_u8(&mut w, chunk.algorithm.as_byte())?;
                record::write_f64(&mut w, chunk.heat)?;
                record::write_u64(&mut w, chunk.last_access)?;
            }
        }
        w.flush()?;
        Ok(())
    }

    fn load_manifests(&mut self) -> Result<()> {
        let path = self.root.join(MANIFEST_FILE);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        let mut r = BufReader::new(file);
        self.read_manifests(&mut r).map_err(|e| match e {
            SedimentError::Io(io) => SedimentError::Corrupt {
                file: path.display().to_string(),
                reason: io.to_string(),
            },
            other => other,
        })
    }

    fn read_manifests<R: Read>(&mut self, r: &mut R) -> Result<()> {
        let num_blobs = record::read_u32(r)?;
        for _ in 0..num_blobs {
            let key = record::read_str(r)?;
            let total_size = record::read_u64(r)?;
            let chunk_size = record::read_u64(r)?;
            let num_chunks = record::read_u32(r)?;
            let count = record::read_u32(r)?;
            let mut chunks = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let original_size = record::read_u64(r)?;
                let encoded_size = record::read_u64(r)?;
                let tier_byte = record::read_u8(r)?;
                let algo_byte = record::read_u8(r)?;
                let tier = Tier::from_byte(tier_byte).ok_or_else(|| SedimentError::Corrupt {
                    file: MANIFEST_FILE.to_string(),
                    reason: format!("unknown tier tag {tier_byte} for key {key:?}"),
                })?;
                let algorithm =
                    Algorithm::from_byte(algo_byte).ok_or_else(|| SedimentError::Corrupt {
                        file: MANIFEST_FILE.to_string(),
                        reason: format!("unknown algorithm tag {algo_byte} for key {key:?}"),
                    })?;
                let heat = record::read_f64(r)?;
                let last_access = record::read_u64(r)?;
                chunks.push(ChunkMeta {
                    original_size,
                    encoded_size,
                    tier,
                    algorithm,
                    heat,
                    last_access,
                });
            }
            self.manifests.insert(
                key.clone(),
                ChunkManifest {
                    key,
                    total_size,
                    chunk_size,
                    num_chunks,
                    chunks,
                },
            );
        }
        debug!(blobs = self.manifests.len(), "chunk manifests loaded");
        Ok(())
    }
}
