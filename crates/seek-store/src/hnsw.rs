//! HNSW index implementation using usearch.
//!
//! Vectors are stored unquantized (F32) with one vector per key, so a
//! fetched vector is bit-identical to the inserted one.
//!
//! File layout written by `save`:
//! - 8 bytes magic `SEEKIDX1`
//! - u32 little-endian header length
//! - JSON-encoded `IndexConfig`
//! - usearch serialized index

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info};
use usearch::{Index, IndexOptions, MetricKind, ScalarKind};

use seek_types::DistanceSpace;

use crate::error::VectorError;
use crate::index::{AnnIndex, IndexConfig};
use crate::matrix::VectorMatrix;

const MAGIC: &[u8; 8] = b"SEEKIDX1";

/// Capacity reserved on the first insert
const INITIAL_CAPACITY: usize = 64;

fn metric_kind(space: DistanceSpace) -> MetricKind {
    match space {
        DistanceSpace::Euclidean => MetricKind::L2sq,
        DistanceSpace::Cosine => MetricKind::Cos,
        DistanceSpace::InnerProduct => MetricKind::IP,
    }
}

fn index_options(config: &IndexConfig) -> IndexOptions {
    IndexOptions {
        dimensions: config.dimensions,
        metric: metric_kind(config.space),
        quantization: ScalarKind::F32,
        connectivity: config.connectivity,
        expansion_add: config.ef_construction,
        expansion_search: config.ef_search,
        multi: false, // Single vector per key
    }
}

/// HNSW index wrapper around usearch.
pub struct HnswIndex {
    index: Index,
    config: IndexConfig,
}

impl std::fmt::Debug for HnswIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HnswIndex")
            .field("config", &self.config)
            .field("size", &self.index.size())
            .finish()
    }
}

impl HnswIndex {
    fn new_index(config: &IndexConfig) -> Result<Index, VectorError> {
        // usearch accepts zero dimensions but faults on the first lookup
        if config.dimensions == 0 {
            return Err(VectorError::Index(
                "index dimensions must be > 0".to_string(),
            ));
        }
        Index::new(&index_options(config)).map_err(|e| VectorError::Index(e.to_string()))
    }

    fn check_dimension(&self, actual: usize) -> Result<(), VectorError> {
        if actual != self.config.dimensions {
            return Err(VectorError::DimensionMismatch {
                expected: self.config.dimensions,
                actual,
            });
        }
        Ok(())
    }

    /// Grow capacity geometrically so `additional` more vectors fit.
    fn reserve_for(&self, additional: usize) -> Result<(), VectorError> {
        let needed = self.index.size() + additional;
        let capacity = self.index.capacity();
        if needed <= capacity {
            return Ok(());
        }
        let target = needed.max(capacity * 2).max(INITIAL_CAPACITY);
        self.index
            .reserve(target)
            .map_err(|e| VectorError::Index(e.to_string()))?;
        debug!(capacity = target, "Reserved index capacity");
        Ok(())
    }

    fn encode(&self) -> Result<Vec<u8>, VectorError> {
        let header = serde_json::to_vec(&self.config)
            .map_err(|e| VectorError::Serialization(e.to_string()))?;
        let header_len = u32::try_from(header.len())
            .map_err(|_| VectorError::Serialization("index header too large".to_string()))?;

        let mut blob = vec![0u8; self.index.serialized_length()];
        self.index
            .save_to_buffer(&mut blob)
            .map_err(|e| VectorError::Index(format!("Failed to serialize: {}", e)))?;

        let mut bytes = Vec::with_capacity(MAGIC.len() + 4 + header.len() + blob.len());
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&header_len.to_le_bytes());
        bytes.extend_from_slice(&header);
        bytes.extend_from_slice(&blob);
        Ok(bytes)
    }

    fn decode(bytes: &[u8]) -> Result<Self, VectorError> {
        let body = bytes
            .strip_prefix(MAGIC.as_slice())
            .ok_or_else(|| VectorError::InvalidIndexFile("missing magic".to_string()))?;
        if body.len() < 4 {
            return Err(VectorError::InvalidIndexFile("truncated header".to_string()));
        }
        let (len_bytes, rest) = body.split_at(4);
        let mut len_buf = [0u8; 4];
        len_buf.copy_from_slice(len_bytes);
        let header_len = u32::from_le_bytes(len_buf) as usize;
        if rest.len() < header_len {
            return Err(VectorError::InvalidIndexFile("truncated header".to_string()));
        }
        let (header, blob) = rest.split_at(header_len);

        let config: IndexConfig = serde_json::from_slice(header)
            .map_err(|e| VectorError::InvalidIndexFile(e.to_string()))?;
        let index = Self::new_index(&config)?;
        index
            .load_from_buffer(blob)
            .map_err(|e| VectorError::Index(format!("Failed to load: {}", e)))?;

        if index.dimensions() != config.dimensions {
            return Err(VectorError::InvalidIndexFile(format!(
                "header declares {} dimensions, index has {}",
                config.dimensions,
                index.dimensions()
            )));
        }

        Ok(Self { index, config })
    }
}

impl AnnIndex for HnswIndex {
    fn create(config: IndexConfig) -> Result<Self, VectorError> {
        let index = Self::new_index(&config)?;
        debug!(dim = config.dimensions, space = %config.space, "Created vector index");
        Ok(Self { index, config })
    }

    fn load(path: &Path) -> Result<Self, VectorError> {
        let bytes = fs::read(path)?;
        let loaded = Self::decode(&bytes)?;
        info!(path = ?path, vectors = loaded.len(), "Loaded vector index");
        Ok(loaded)
    }

    fn config(&self) -> &IndexConfig {
        &self.config
    }

    fn len(&self) -> usize {
        self.index.size()
    }

    fn contains(&self, id: u64) -> bool {
        self.index.contains(id)
    }

    fn add(&mut self, id: u64, vector: &[f32]) -> Result<(), VectorError> {
        self.check_dimension(vector.len())?;
        self.reserve_for(1)?;
        self.index
            .add(id, vector)
            .map_err(|e| VectorError::Index(e.to_string()))?;

        debug!(id = id, "Added vector");
        Ok(())
    }

    fn add_batch(&mut self, ids: &[u64], vectors: &VectorMatrix) -> Result<(), VectorError> {
        if ids.len() != vectors.rows() {
            return Err(VectorError::BatchLengthMismatch {
                ids: ids.len(),
                rows: vectors.rows(),
            });
        }
        if ids.is_empty() {
            return Ok(());
        }
        self.check_dimension(vectors.dimensions())?;
        self.reserve_for(ids.len())?;

        for (&id, vector) in ids.iter().zip(vectors.iter_rows()) {
            self.index
                .add(id, vector)
                .map_err(|e| VectorError::Index(e.to_string()))?;
        }

        debug!(count = ids.len(), "Added vector batch");
        Ok(())
    }

    fn get(&self, id: u64) -> Result<Vec<f32>, VectorError> {
        let mut buffer = vec![0.0f32; self.config.dimensions];
        // usearch returns the number of vectors found for the key
        match self.index.get(id, &mut buffer) {
            Ok(count) if count > 0 => Ok(buffer),
            Ok(_) => Err(VectorError::NotFound(id)),
            Err(e) => Err(VectorError::Index(e.to_string())),
        }
    }

    fn get_batch(&self, ids: &[u64]) -> Result<VectorMatrix, VectorError> {
        let missing = ids.iter().filter(|&&id| !self.index.contains(id)).count();
        if missing > 0 {
            return Err(VectorError::PartialHit {
                missing,
                requested: ids.len(),
            });
        }

        let mut matrix = VectorMatrix::with_capacity(self.config.dimensions, ids.len());
        for &id in ids {
            matrix.push_row(&self.get(id)?)?;
        }
        Ok(matrix)
    }

    fn save(&self, path: &Path) -> Result<(), VectorError> {
        let bytes = self.encode()?;

        // Temp file in the target directory so the rename stays on one filesystem
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(parent)?;
        temp.write_all(&bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| VectorError::Io(e.error))?;

        info!(path = ?path, vectors = self.len(), "Saved vector index");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexDefaults, IndexOverrides};
    use tempfile::TempDir;

    fn config(dim: usize) -> IndexConfig {
        IndexDefaults::default().resolve(&IndexOverrides::default(), dim)
    }

    fn random_vector(dim: usize) -> Vec<f32> {
        use rand::Rng;
        let mut rng = rand::rng();
        (0..dim).map(|_| rng.random()).collect()
    }

    #[test]
    fn test_create_index() {
        let index = HnswIndex::create(config(32)).unwrap();
        assert_eq!(index.config().dimensions, 32);
        assert!(index.is_empty());
    }

    #[test]
    fn test_create_zero_dimensions_rejected() {
        let result = HnswIndex::create(config(0));
        assert!(matches!(result, Err(VectorError::Index(_))));
    }

    #[test]
    fn test_add_and_get() {
        let mut index = HnswIndex::create(config(16)).unwrap();
        let vector = random_vector(16);
        index.add(7, &vector).unwrap();

        assert_eq!(index.len(), 1);
        assert!(index.contains(7));
        assert_eq!(index.get(7).unwrap(), vector);
        assert!(matches!(index.get(8), Err(VectorError::NotFound(8))));
    }

    #[test]
    fn test_grows_past_initial_capacity() {
        let mut index = HnswIndex::create(config(8)).unwrap();
        for id in 0..(INITIAL_CAPACITY as u64 * 3) {
            index.add(id, &random_vector(8)).unwrap();
        }
        assert_eq!(index.len(), INITIAL_CAPACITY * 3);
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut index = HnswIndex::create(config(64)).unwrap();
        let result = index.add(0, &random_vector(32));
        assert!(matches!(
            result,
            Err(VectorError::DimensionMismatch {
                expected: 64,
                actual: 32
            })
        ));
    }

    #[test]
    fn test_add_batch_length_mismatch() {
        let mut index = HnswIndex::create(config(4)).unwrap();
        let vectors = VectorMatrix::from_rows(&[random_vector(4), random_vector(4)]).unwrap();
        let result = index.add_batch(&[1, 2, 3], &vectors);
        assert!(matches!(
            result,
            Err(VectorError::BatchLengthMismatch { ids: 3, rows: 2 })
        ));
        assert!(index.is_empty());
    }

    #[test]
    fn test_get_batch_all_or_nothing() {
        let mut index = HnswIndex::create(config(4)).unwrap();
        let rows = vec![random_vector(4), random_vector(4)];
        let vectors = VectorMatrix::from_rows(&rows).unwrap();
        index.add_batch(&[10, 20], &vectors).unwrap();

        let fetched = index.get_batch(&[20, 10]).unwrap();
        assert_eq!(fetched.row(0), Some(rows[1].as_slice()));
        assert_eq!(fetched.row(1), Some(rows[0].as_slice()));

        let partial = index.get_batch(&[10, 30, 40]);
        assert!(matches!(
            partial,
            Err(VectorError::PartialHit {
                missing: 2,
                requested: 3
            })
        ));
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("group.idx");
        let mut cfg = config(12);
        cfg.space = DistanceSpace::Cosine;
        cfg.ef_construction = 64;

        let mut index = HnswIndex::create(cfg.clone()).unwrap();
        let vectors: Vec<Vec<f32>> = (0..5).map(|_| random_vector(12)).collect();
        for (id, v) in vectors.iter().enumerate() {
            index.add(id as u64, v).unwrap();
        }
        index.save(&path).unwrap();

        let loaded = HnswIndex::load(&path).unwrap();
        assert_eq!(loaded.len(), 5);
        assert_eq!(loaded.config(), &cfg);
        for (id, v) in vectors.iter().enumerate() {
            assert_eq!(&loaded.get(id as u64).unwrap(), v);
        }
    }

    #[test]
    fn test_loaded_index_accepts_inserts() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("group.idx");

        let mut index = HnswIndex::create(config(4)).unwrap();
        index.add(1, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        index.save(&path).unwrap();

        let mut loaded = HnswIndex::load(&path).unwrap();
        loaded.add(2, &[5.0, 6.0, 7.0, 8.0]).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get(2).unwrap(), vec![5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_load_rejects_foreign_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bogus.idx");
        fs::write(&path, b"not an index").unwrap();

        let result = HnswIndex::load(&path);
        assert!(matches!(result, Err(VectorError::InvalidIndexFile(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = HnswIndex::load(&temp.path().join("absent.idx"));
        assert!(matches!(result, Err(VectorError::Io(_))));
    }
}
