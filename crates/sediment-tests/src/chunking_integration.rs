//! Chunked-blob behavior through the public engine surface.

#[cfg(test)]
mod tests {
    use sediment::{Config, Database, ReorgStrategy, SedimentError, Tier};
    use std::path::Path;
    use tempfile::tempdir;

    const KIB: u64 = 1024;

    fn open_in(dir: &Path, name: &str, config: Config) -> Database {
        let stem = dir.join(name);
        Database::open(stem.to_str().unwrap(), config).unwrap()
    }

    fn chunked_config(threshold: u64, chunk_size: u64) -> Config {
        Config {
            enable_chunking: true,
            chunking_threshold: threshold,
            chunk_size,
            reorg_strategy: ReorgStrategy::Manual,
            ..Config::default()
        }
    }

    fn patterned(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 256) as u8).collect()
    }

    #[test]
    fn megabyte_blob_splits_into_four_chunks() {
        let dir = tempdir().unwrap();
        let mut db = open_in(dir.path(), "mb", chunked_config(512 * KIB, 256 * KIB));

        let data = patterned(1024 * KIB as usize);
        db.insert("video", &data).unwrap();

        assert!(db.is_chunked("video"));
        let manifest = db.get_chunk_manifest("video").unwrap();
        assert_eq!(manifest.num_chunks, 4);
        assert_eq!(manifest.total_size, 1024 * KIB);
        assert_eq!(manifest.chunk_size, 256 * KIB);

        // Middle window: bytes [256 KiB, 768 KiB).
        let middle = db.get_chunk_range("video", 1, 2).unwrap().unwrap();
        assert_eq!(middle.len(), 512 * KIB as usize);
        assert_eq!(middle[..], data[256 * KIB as usize..768 * KIB as usize]);
    }

    #[test]
    fn threshold_boundary_decides_chunking() {
        let dir = tempdir().unwrap();
        let mut db = open_in(dir.path(), "edge", chunked_config(512 * KIB, 256 * KIB));

        db.insert("under", &patterned(512 * KIB as usize - 1)).unwrap();
        db.insert("at", &patterned(512 * KIB as usize)).unwrap();

        assert!(!db.is_chunked("under"));
        assert!(db.is_chunked("at"));
    }

    #[test]
    fn exact_multiple_has_full_final_chunk() {
        let dir = tempdir().unwrap();
        let mut db = open_in(dir.path(), "exact", chunked_config(4 * KIB, 4 * KIB));

        db.insert("even", &patterned(16 * KIB as usize)).unwrap();
        let manifest = db.get_chunk_manifest("even").unwrap();
        assert_eq!(manifest.num_chunks, 4);
        assert_eq!(manifest.chunks.last().unwrap().original_size, 4 * KIB);

        db.insert("odd", &patterned(16 * KIB as usize + 1)).unwrap();
        let manifest = db.get_chunk_manifest("odd").unwrap();
        assert_eq!(manifest.num_chunks, 5);
        assert_eq!(manifest.chunks.last().unwrap().original_size, 1);
        for chunk in &manifest.chunks[..4] {
            assert_eq!(chunk.original_size, 4 * KIB);
        }
    }

    #[test]
    fn full_read_concatenates_all_chunks() {
        let dir = tempdir().unwrap();
        let mut db = open_in(dir.path(), "full", chunked_config(4 * KIB, 4 * KIB));

        let data = patterned(10 * KIB as usize);
        db.insert("blob", &data).unwrap();
        assert_eq!(db.get("blob").unwrap().unwrap(), data);

        let n = db.get_chunk_manifest("blob").unwrap().num_chunks;
        let explicit = db.get_chunk_range("blob", 0, n - 1).unwrap().unwrap();
        assert_eq!(explicit, data);
    }

    #[test]
    fn bad_ranges_error_and_missing_keys_are_none() {
        let dir = tempdir().unwrap();
        let mut db = open_in(dir.path(), "ranges", chunked_config(4 * KIB, 4 * KIB));

        assert!(db.get_chunk_range("ghost", 0, 0).unwrap().is_none());

        db.insert("blob", &patterned(12 * KIB as usize)).unwrap();
        assert!(matches!(
            db.get_chunk_range("blob", 2, 1),
            Err(SedimentError::RangeInvalid { .. })
        ));
        assert!(matches!(
            db.get_chunk_range("blob", 0, 3),
            Err(SedimentError::RangeInvalid { .. })
        ));
    }

    #[test]
    fn chunked_blobs_survive_reopen() {
        let dir = tempdir().unwrap();
        let data = patterned(20 * KIB as usize);
        {
            let mut db = open_in(dir.path(), "reopen", chunked_config(4 * KIB, 4 * KIB));
            db.insert("blob", &data).unwrap();
        }
        let mut db = open_in(dir.path(), "reopen", chunked_config(4 * KIB, 4 * KIB));
        assert!(db.is_chunked("blob"));
        assert_eq!(db.get("blob").unwrap().unwrap(), data);
    }

    #[test]
    fn remove_clears_chunk_files() {
        let dir = tempdir().unwrap();
        let stem = dir.path().join("rm");
        let mut db =
            Database::open(stem.to_str().unwrap(), chunked_config(4 * KIB, 4 * KIB)).unwrap();

        db.insert("blob", &patterned(12 * KIB as usize)).unwrap();
        let blob_dir = stem.with_extension("db").join("chunks").join("blob");
        assert!(blob_dir.join("chunk_000.bin").exists());

        assert!(db.remove("blob").unwrap());
        assert!(!blob_dir.exists());
        assert!(db.get("blob").unwrap().is_none());
        assert!(db.get_chunk_manifest("blob").is_none());
    }

    #[test]
    fn range_reads_heat_only_touched_chunks() {
        let dir = tempdir().unwrap();
        let mut db = open_in(dir.path(), "heatmap", chunked_config(4 * KIB, 4 * KIB));

        db.insert("blob", &patterned(16 * KIB as usize)).unwrap();
        db.get_chunk_range("blob", 1, 2).unwrap();
        db.get_chunk_range("blob", 1, 1).unwrap();

        let manifest = db.get_chunk_manifest("blob").unwrap();
        let heats: Vec<f64> = manifest.chunks.iter().map(|c| c.heat).collect();
        assert!((heats[0] - 0.1).abs() < 1e-12);
        assert!((heats[1] - 0.4).abs() < 1e-12);
        assert!((heats[2] - 0.3).abs() < 1e-12);
        assert!((heats[3] - 0.1).abs() < 1e-12);
        assert!(manifest.chunks.iter().all(|c| c.tier == Tier::T4));
    }
}
