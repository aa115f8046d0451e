//! End-to-end test infrastructure for seek-store.
//!
//! Provides a shared TestHarness and vector helpers for tests that exercise
//! the store against real usearch indexes on disk.

use std::path::PathBuf;

use rand::Rng;

use seek_store::{GroupedVectorStore, HnswIndex, IndexDefaults, VectorMatrix};

/// Shared test harness for E2E tests.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Directory the store persists into (not created up front)
    pub store_dir: PathBuf,
}

impl TestHarness {
    /// Create a new test harness with a fresh temp directory.
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let store_dir = temp_dir.path().join("output");
        Self {
            _temp_dir: temp_dir,
            store_dir,
        }
    }

    /// Empty store with default index settings.
    pub fn store(&self) -> GroupedVectorStore<HnswIndex> {
        GroupedVectorStore::new(IndexDefaults::default())
    }

    /// Fresh store reloaded from `store_dir`.
    pub fn reloaded_store(&self) -> GroupedVectorStore<HnswIndex> {
        let mut store = self.store();
        store
            .reload(&self.store_dir)
            .expect("Failed to reload store");
        store
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// `[offset, offset + 1, ..., offset + n - 1]`
pub fn arange(n: usize, offset: f32) -> Vec<f32> {
    (0..n).map(|x| x as f32 + offset).collect()
}

/// Stack rows into a matrix.
pub fn stack(rows: &[Vec<f32>]) -> VectorMatrix {
    VectorMatrix::from_rows(rows).expect("Rows must share a length")
}

/// Random vector with components in [0, 1).
pub fn random_vector(dim: usize) -> Vec<f32> {
    let mut rng = rand::rng();
    (0..dim).map(|_| rng.random()).collect()
}
