//! Non-chunked blob store: key to encoded bytes, persisted as `data.db`.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{Result, SedimentError};
use crate::record;

/// Per-record framing overhead: two u32 length prefixes.
const RECORD_OVERHEAD: u64 = 8;

/// In-memory map of already-encoded values, rewritten to `data.db` in full
/// on flush and shutdown.
#[derive(Debug, Default)]
pub struct BlobStore {
    entries: BTreeMap<String, Vec<u8>>,
    serialized_bytes: u64,
}

impl BlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value. `value` holds already-encoded bytes; the
    /// algorithm used lives in the metadata store.
    pub fn put(&mut self, key: &str, value: Vec<u8>) {
        let added = RECORD_OVERHEAD + key.len() as u64 + value.len() as u64;
        if let Some(old) = self.entries.insert(key.to_string(), value) {
            self.serialized_bytes -= RECORD_OVERHEAD + key.len() as u64 + old.len() as u64;
        }
        self.serialized_bytes += added;
    }

    /// Stored (encoded) bytes for a key.
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Delete a key; returns whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(old) => {
                self.serialized_bytes -= RECORD_OVERHEAD + key.len() as u64 + old.len() as u64;
                true
            }
            None => false,
        }
    }

    /// Whether a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All stored keys, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Exact size of the `data.db` this store serializes to.
    pub fn size_on_disk(&self) -> u64 {
        self.serialized_bytes
    }

    /// Rewrite `data.db` in full.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        for (key, value) in &self.entries {
            record::write_str(&mut w, key)?;
            record::write_bytes(&mut w, value)?;
        }
        w.flush()?;
        debug!(entries = self.entries.len(), bytes = self.serialized_bytes, "blob store saved");
        Ok(())
    }

    /// Load `data.db`; a missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(e.into()),
        };
        let mut r = BufReader::new(file);
        let mut store = Self::new();
        loop {
            let key = match record::read_str(&mut r) {
                Ok(k) => k,
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
                Err(e) => {
                    return Err(SedimentError::Corrupt {
                        file: path.display().to_string(),
                        reason: e.to_string(),
                    })
                }
            };
            let value = record::read_bytes(&mut r).map_err(|e| SedimentError::Corrupt {
                file: path.display().to_string(),
                reason: format!("truncated record for key {key:?}: {e}"),
            })?;
            store.put(&key, value);
        }
        debug!(entries = store.entries.len(), "blob store loaded");
        Ok(store)
    }
}
