//! Entry descriptors and the metadata store, persisted as `metadata.db`.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::Algorithm;
use crate::error::{Result, SedimentError};
use crate::record;
use crate::tiering::{Tier, INITIAL_HEAT};

/// Descriptor for one non-chunked entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntryMeta {
    /// Successful reads since creation.
    pub access_count: u64,
    /// Epoch seconds of the last successful read (creation time initially).
    pub last_access: u64,
    /// Tier the entry was last organized into.
    pub tier: Tier,
    /// Algorithm the stored bytes are currently encoded with.
    pub algorithm: Algorithm,
    /// Length before encoding.
    pub original_size: u64,
    /// Length on disk.
    pub encoded_size: u64,
    /// Time-decaying access score in `[0, 1]`; meaningful when heat decay
    /// is enabled.
    pub heat: f64,
}

impl EntryMeta {
    /// Descriptor for a freshly inserted entry: cold tier, zero reads.
    pub fn new(original_size: u64, encoded_size: u64, algorithm: Algorithm, now: u64) -> Self {
        Self {
            access_count: 0,
            last_access: now,
            tier: Tier::T4,
            algorithm,
            original_size,
            encoded_size,
            heat: INITIAL_HEAT,
        }
    }
}

/// Engine-wide counters persisted in the `metadata.db` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetaHeader {
    /// All successful non-chunked reads since creation.
    pub total_accesses: u64,
    /// Operations since the last reorganization pass.
    pub ops_since_reorg: u64,
    /// Epoch seconds of the last reorganization pass.
    pub last_reorg_ts: u64,
    /// Epoch seconds of the last decay pass. Written only when heat decay
    /// is enabled.
    pub last_decay_ts: u64,
}

/// Key to descriptor map with the engine-wide header.
#[derive(Debug)]
pub struct MetaStore {
    /// Engine-wide counters, persisted ahead of the entries.
    pub header: MetaHeader,
    entries: BTreeMap<String, EntryMeta>,
    /// Whether the heat field (and the header's decay timestamp) are part
    /// of the on-disk layout.
    track_heat: bool,
}

impl MetaStore {
    /// Create an empty store. `track_heat` fixes the on-disk layout.
    pub fn new(track_heat: bool) -> Self {
        Self {
            header: MetaHeader::default(),
            entries: BTreeMap::new(),
            track_heat,
        }
    }

    /// Insert or replace a descriptor.
    pub fn insert(&mut self, key: &str, meta: EntryMeta) {
        self.entries.insert(key.to_string(), meta);
    }

    /// Descriptor for a key.
    pub fn get(&self, key: &str) -> Option<&EntryMeta> {
        self.entries.get(key)
    }

    /// Mutable descriptor for a key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut EntryMeta> {
        self.entries.get_mut(key)
    }

    /// Delete a descriptor; returns whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Whether a key has a descriptor.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of descriptors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no descriptors.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All described keys, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Iterate descriptors in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &EntryMeta)> {
        self.entries.iter()
    }

    /// Iterate descriptors mutably in key order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut EntryMeta)> {
        self.entries.iter_mut()
    }

    /// Rewrite `metadata.db` in full.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        record::write_u64(&mut w, self.header.total_accesses)?;
        record::write_u64(&mut w, self.header.ops_since_reorg)?;
        record::write_u64(&mut w, self.header.last_reorg_ts)?;
        if self.track_heat {
            record::write_u64(&mut w, self.header.last_decay_ts)?;
        }
        record::write_u32(&mut w, self.entries.len() as u32)?;
        for (key, meta) in &self.entries {
            record::write_str(&mut w, key)?;
            record::write_u64(&mut w, meta.access_count)?;
            record::write_u64(&mut w, meta.last_access)?;
            record::write_u8(&mut w, meta.tier.as_byte())?;
            record::write_u8(&mut w, meta.algorithm.as_byte())?;
            record::write_u64(&mut w, meta.original_size)?;
            record::write_u64(&mut w, meta.encoded_size)?;
            if self.track_heat {
                record::write_f64(&mut w, meta.heat)?;
            }
        }
        w.flush()?;
        debug!(entries = self.entries.len(), "metadata store saved");
        Ok(())
    }

    /// Load `metadata.db`; a missing file yields an empty store.
    pub fn load(path: &Path, track_heat: bool) -> Result<Self> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::new(track_heat)),
            Err(e) => return Err(e.into()),
        };
        let mut r = BufReader::new(file);
        Self::read_from(&mut r, track_heat).map_err(|e| match e {
            SedimentError::Io(io) => SedimentError::Corrupt {
                file: path.display().to_string(),
                reason: io.to_string(),
            },
            other => other,
        })
    }

    fn read_from<R: Read>(r: &mut R, track_heat: bool) -> Result<Self> {
        let mut store = Self::new(track_heat);
        store.header.total_accesses = record::read_u64(r)?;
        store.header.ops_since_reorg = record::read_u64(r)?;
        store.header.last_reorg_ts = record::read_u64(r)?;
        if track_heat {
            store.header.last_decay_ts = record::read_u64(r)?;
        }
        let count = record::read_u32(r)?;
        for _ in 0..count {
            let key = record::read_str(r)?;
            let access_count = record::read_u64(r)?;
            let last_access = record::read_u64(r)?;
            let tier_byte = record::read_u8(r)?;
            let algo_byte = record::read_u8(r)?;
            let tier = Tier::from_byte(tier_byte).ok_or_else(|| SedimentError::Corrupt {
                file: "metadata.db".to_string(),
                reason: format!("unknown tier tag {tier_byte} for key {key:?}"),
            })?;
            let algorithm =
                Algorithm::from_byte(algo_byte).ok_or_else(|| SedimentError::Corrupt {
                    file: "metadata.db".to_string(),
                    reason: format!("unknown algorithm tag {algo_byte} for key {key:?}"),
                })?;
            let original_size = record::read_u64(r)?;
            let encoded_size = record::read_u64(r)?;
            let heat = if track_heat { record::read_f64(r)? } else { 0.0 };
            store.entries.insert(
                key,
                EntryMeta {
                    access_count,
                    last_access,
                    tier,
                    algorithm,
                    original_size,
                    encoded_size,
                    heat,
                },
            );
        }
        debug!(entries = store.entries.len(), "metadata store loaded");
        Ok(store)
    }
}
