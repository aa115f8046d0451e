//! # seek-store
//!
//! Grouped vector store: many independent ANN indexes, one per group name,
//! behind uniform insert/fetch/persist operations.
//!
//! ## Features
//! - Lazy group creation from the first inserted vector's dimensionality
//! - Batch fetch with NaN-filled rows for missing ids
//! - One self-describing `<group>.idx` file per group, usearch HNSW inside
//!
//! ```no_run
//! use seek_store::{GroupedVectorStore, HnswIndex};
//!
//! let mut store: GroupedVectorStore<HnswIndex> = GroupedVectorStore::default();
//! store.insert("users", 42, &[0.1, 0.2, 0.3])?;
//! assert!(store.fetch("users", 42)?.is_some());
//! store.persist("./groups")?;
//! # Ok::<(), seek_store::VectorError>(())
//! ```

pub mod error;
pub mod hnsw;
pub mod index;
pub mod matrix;
pub mod store;

pub use error::VectorError;
pub use hnsw::HnswIndex;
pub use index::{AnnIndex, IndexConfig, IndexDefaults, IndexOverrides, IndexStats};
pub use matrix::VectorMatrix;
pub use store::{GroupedVectorStore, INDEX_SUFFIX};
