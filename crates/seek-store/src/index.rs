//! ANN index trait and construction configuration.
//!
//! Defines the per-group index contract the store is built on.

use std::path::Path;

use seek_types::{DistanceSpace, IndexSettings};
use serde::{Deserialize, Serialize};

use crate::error::VectorError;
use crate::matrix::VectorMatrix;

/// Construction configuration of one group index.
///
/// Fixed once the index is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Vector dimensionality
    pub dimensions: usize,
    /// Distance space
    pub space: DistanceSpace,
    /// Build-time search depth (ef_construction)
    pub ef_construction: usize,
    /// Number of connections per layer (M parameter)
    pub connectivity: usize,
    /// Query-time search depth (ef_search)
    pub ef_search: usize,
}

/// Store-wide defaults for groups created without explicit overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefaults {
    pub space: DistanceSpace,
    pub ef_construction: usize,
    pub connectivity: usize,
    pub ef_search: usize,
}

impl Default for IndexDefaults {
    fn default() -> Self {
        Self {
            space: DistanceSpace::Euclidean,
            ef_construction: 200,
            connectivity: 16,
            ef_search: 100,
        }
    }
}

impl From<&IndexSettings> for IndexDefaults {
    fn from(settings: &IndexSettings) -> Self {
        Self {
            space: settings.space,
            ef_construction: settings.ef_construction,
            connectivity: settings.connectivity,
            ef_search: settings.ef_search,
        }
    }
}

impl IndexDefaults {
    pub fn new(space: DistanceSpace, ef_construction: usize) -> Self {
        Self {
            space,
            ef_construction,
            ..Default::default()
        }
    }

    /// Merge `overrides` over these defaults into a full configuration.
    pub fn resolve(&self, overrides: &IndexOverrides, dimensions: usize) -> IndexConfig {
        IndexConfig {
            dimensions,
            space: overrides.space.unwrap_or(self.space),
            ef_construction: overrides.ef_construction.unwrap_or(self.ef_construction),
            connectivity: overrides.connectivity.unwrap_or(self.connectivity),
            ef_search: overrides.ef_search.unwrap_or(self.ef_search),
        }
    }
}

/// Per-call overrides used only when the call creates a group.
///
/// Ignored for groups that already exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexOverrides {
    pub space: Option<DistanceSpace>,
    pub ef_construction: Option<usize>,
    pub connectivity: Option<usize>,
    pub ef_search: Option<usize>,
}

impl IndexOverrides {
    pub fn with_space(mut self, space: DistanceSpace) -> Self {
        self.space = Some(space);
        self
    }

    pub fn with_ef_construction(mut self, ef_construction: usize) -> Self {
        self.ef_construction = Some(ef_construction);
        self
    }

    pub fn with_connectivity(mut self, m: usize) -> Self {
        self.connectivity = Some(m);
        self
    }

    pub fn with_ef_search(mut self, ef_search: usize) -> Self {
        self.ef_search = Some(ef_search);
        self
    }
}

/// Index statistics
#[derive(Debug, Clone, PartialEq)]
pub struct IndexStats {
    /// Number of vectors in the index
    pub vector_count: usize,
    /// Vector dimension
    pub dimensions: usize,
    /// Distance space
    pub space: DistanceSpace,
}

/// Trait for the ANN index backing one group.
///
/// Implementations are mutated through `&mut self` only; callers that share
/// an index across threads must provide their own locking.
pub trait AnnIndex: Send + Sized {
    /// Create an empty index.
    fn create(config: IndexConfig) -> Result<Self, VectorError>;

    /// Load an index from a file written by [`AnnIndex::save`].
    fn load(path: &Path) -> Result<Self, VectorError>;

    /// Construction configuration
    fn config(&self) -> &IndexConfig;

    /// Number of stored vectors
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if an id is present
    fn contains(&self, id: u64) -> bool;

    /// Add one vector. Fails with `DimensionMismatch` on a wrong length.
    fn add(&mut self, id: u64, vector: &[f32]) -> Result<(), VectorError>;

    /// Add one vector per id, row `i` of `vectors` belonging to `ids[i]`.
    fn add_batch(&mut self, ids: &[u64], vectors: &VectorMatrix) -> Result<(), VectorError>;

    /// Get one vector. Fails with `NotFound` when absent.
    fn get(&self, id: u64) -> Result<Vec<f32>, VectorError>;

    /// Get all vectors, one row per id in input order.
    ///
    /// All-or-nothing: fails with `PartialHit` if any id is absent.
    fn get_batch(&self, ids: &[u64]) -> Result<VectorMatrix, VectorError>;

    /// Write the index to `path`.
    fn save(&self, path: &Path) -> Result<(), VectorError>;

    /// Get index statistics
    fn stats(&self) -> IndexStats {
        let config = self.config();
        IndexStats {
            vector_count: self.len(),
            dimensions: config.dimensions,
            space: config.space,
        }
    }
}
