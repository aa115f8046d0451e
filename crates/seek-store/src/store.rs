//! Grouped vector store.
//!
//! Owns one ANN index per group name. Groups are created lazily by the first
//! insert into them, using the inserted vector's length as dimensionality.
//!
//! The store takes `&mut self` for every mutation and holds no locks: it is
//! single-writer. Callers sharing a store across threads must wrap it
//! themselves (e.g. in a `Mutex`), which also serializes group creation.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use seek_types::Settings;
use tracing::{debug, info};

use crate::error::VectorError;
use crate::hnsw::HnswIndex;
use crate::index::{AnnIndex, IndexConfig, IndexDefaults, IndexOverrides, IndexStats};
use crate::matrix::VectorMatrix;

/// File suffix of persisted group indexes
pub const INDEX_SUFFIX: &str = ".idx";

/// Multiple independent ANN indexes keyed by group name.
#[derive(Debug)]
pub struct GroupedVectorStore<I: AnnIndex = HnswIndex> {
    defaults: IndexDefaults,
    groups: BTreeMap<String, I>,
}

impl<I: AnnIndex> Default for GroupedVectorStore<I> {
    fn default() -> Self {
        Self::new(IndexDefaults::default())
    }
}

impl<I: AnnIndex> GroupedVectorStore<I> {
    /// Create an empty store.
    pub fn new(defaults: IndexDefaults) -> Self {
        Self {
            defaults,
            groups: BTreeMap::new(),
        }
    }

    /// Create a store and eagerly load each `(group, path)` pair.
    pub fn with_mapping<K, P>(
        defaults: IndexDefaults,
        mapping: impl IntoIterator<Item = (K, P)>,
    ) -> Result<Self, VectorError>
    where
        K: Into<String>,
        P: AsRef<Path>,
    {
        let mut store = Self::new(defaults);
        for (group, path) in mapping {
            let group = group.into();
            let index = I::load(path.as_ref())?;
            info!(group = %group, path = ?path.as_ref(), "Loaded group from mapping");
            store.groups.insert(group, index);
        }
        Ok(store)
    }

    /// Build a store from loaded settings: index defaults plus the eager mapping.
    pub fn from_settings(settings: &Settings) -> Result<Self, VectorError> {
        Self::with_mapping(
            IndexDefaults::from(&settings.index),
            settings.expanded_mapping(),
        )
    }

    pub fn defaults(&self) -> &IndexDefaults {
        &self.defaults
    }

    /// Group names in sorted order
    pub fn groups(&self) -> Vec<&str> {
        self.groups.keys().map(String::as_str).collect()
    }

    pub fn contains_group(&self, group: &str) -> bool {
        self.groups.contains_key(group)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Check if `entity_id` is stored in an existing group.
    pub fn contains(&self, group: &str, entity_id: u64) -> Result<bool, VectorError> {
        self.group(group).map(|index| index.contains(entity_id))
    }

    /// Construction configuration of an existing group.
    pub fn group_config(&self, group: &str) -> Result<&IndexConfig, VectorError> {
        self.group(group).map(AnnIndex::config)
    }

    /// Statistics of an existing group.
    pub fn stats(&self, group: &str) -> Result<IndexStats, VectorError> {
        self.group(group).map(AnnIndex::stats)
    }

    fn group(&self, group: &str) -> Result<&I, VectorError> {
        self.groups
            .get(group)
            .ok_or_else(|| VectorError::GroupNotFound(group.to_string()))
    }

    /// Get the group's index, creating it from `overrides` over the store
    /// defaults when the group does not exist yet.
    fn group_or_create(
        &mut self,
        group: &str,
        dimensions: usize,
        overrides: &IndexOverrides,
    ) -> Result<&mut I, VectorError> {
        match self.groups.entry(group.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let config = self.defaults.resolve(overrides, dimensions);
                info!(
                    group = %group,
                    dim = config.dimensions,
                    space = %config.space,
                    ef_construction = config.ef_construction,
                    "Creating group index"
                );
                let index = I::create(config)?;
                Ok(entry.insert(index))
            }
        }
    }

    /// Drop a group created by an insert whose first add failed.
    fn discard_if_created(&mut self, group: &str, created: bool) {
        if created && self.groups.remove(group).is_some() {
            debug!(group = %group, "Discarded group after failed first insert");
        }
    }

    /// Insert one vector, creating the group with the store defaults if needed.
    pub fn insert(
        &mut self,
        group: &str,
        entity_id: u64,
        vector: &[f32],
    ) -> Result<(), VectorError> {
        self.insert_with_config(group, entity_id, vector, &IndexOverrides::default())
    }

    /// Insert one vector; `overrides` apply only if this call creates the group.
    pub fn insert_with_config(
        &mut self,
        group: &str,
        entity_id: u64,
        vector: &[f32],
        overrides: &IndexOverrides,
    ) -> Result<(), VectorError> {
        let created = !self.groups.contains_key(group);
        let index = self.group_or_create(group, vector.len(), overrides)?;
        if let Err(e) = index.add(entity_id, vector) {
            self.discard_if_created(group, created);
            return Err(e);
        }
        debug!(group = %group, id = entity_id, "Inserted vector");
        Ok(())
    }

    /// Insert a batch: row `i` of `vectors` belongs to `entity_ids[i]`.
    pub fn insert_batch(
        &mut self,
        group: &str,
        entity_ids: &[u64],
        vectors: &VectorMatrix,
    ) -> Result<(), VectorError> {
        self.insert_batch_with_config(group, entity_ids, vectors, &IndexOverrides::default())
    }

    /// Batch insert; `overrides` apply only if this call creates the group.
    pub fn insert_batch_with_config(
        &mut self,
        group: &str,
        entity_ids: &[u64],
        vectors: &VectorMatrix,
        overrides: &IndexOverrides,
    ) -> Result<(), VectorError> {
        if entity_ids.is_empty() && vectors.rows() == 0 {
            debug!(group = %group, "Empty batch, nothing to insert");
            return Ok(());
        }
        let created = !self.groups.contains_key(group);
        let index = self.group_or_create(group, vectors.dimensions(), overrides)?;
        if let Err(e) = index.add_batch(entity_ids, vectors) {
            self.discard_if_created(group, created);
            return Err(e);
        }
        debug!(group = %group, count = entity_ids.len(), "Inserted vector batch");
        Ok(())
    }

    /// Fetch one vector.
    ///
    /// An unknown group is an error; an unknown id in a known group is `None`.
    pub fn fetch(&self, group: &str, entity_id: u64) -> Result<Option<Vec<f32>>, VectorError> {
        let index = self.group(group)?;
        match index.get(entity_id) {
            Ok(vector) => Ok(Some(vector)),
            Err(VectorError::NotFound(_)) => {
                debug!(group = %group, id = entity_id, "Vector not in group");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch one vector, returning `default_value` when the id is absent.
    pub fn fetch_or(
        &self,
        group: &str,
        entity_id: u64,
        default_value: Vec<f32>,
    ) -> Result<Vec<f32>, VectorError> {
        Ok(self.fetch(group, entity_id)?.unwrap_or(default_value))
    }

    /// Fetch vectors as a matrix with one row per id, in input order.
    ///
    /// If some ids are absent the missing rows are filled with NaN, with the
    /// row width taken from the first vector found. If no id is present the
    /// result is `None`.
    pub fn fetch_batch(
        &self,
        group: &str,
        entity_ids: &[u64],
    ) -> Result<Option<VectorMatrix>, VectorError> {
        self.fetch_batch_with_width(group, entity_ids, None)
    }

    /// Batch fetch with a caller default, the batch form of
    /// [`fetch_or`](Self::fetch_or).
    ///
    /// Misses are still NaN rows, never `default_value` itself. The default
    /// only counts as a hit when nothing was found: an all-missing batch
    /// gives NaN rows as wide as `default_value` (`None` if it is empty).
    pub fn fetch_batch_or(
        &self,
        group: &str,
        entity_ids: &[u64],
        default_value: Vec<f32>,
    ) -> Result<Option<VectorMatrix>, VectorError> {
        let width = Some(default_value.len()).filter(|&n| n > 0);
        self.fetch_batch_with_width(group, entity_ids, width)
    }

    fn fetch_batch_with_width(
        &self,
        group: &str,
        entity_ids: &[u64],
        fallback_width: Option<usize>,
    ) -> Result<Option<VectorMatrix>, VectorError> {
        let index = self.group(group)?;
        match index.get_batch(entity_ids) {
            Ok(matrix) => Ok(Some(matrix)),
            Err(VectorError::PartialHit { missing, requested }) => {
                debug!(
                    group = %group,
                    missing = missing,
                    requested = requested,
                    "Partial batch hit, fetching ids one at a time"
                );
                self.fetch_each(group, entity_ids, fallback_width)
            }
            Err(e) => Err(e),
        }
    }

    /// Per-id fallback for batches with misses.
    ///
    /// Row width comes from the first vector found, else `fallback_width`.
    fn fetch_each(
        &self,
        group: &str,
        entity_ids: &[u64],
        fallback_width: Option<usize>,
    ) -> Result<Option<VectorMatrix>, VectorError> {
        let vectors = entity_ids
            .iter()
            .map(|&id| self.fetch(group, id))
            .collect::<Result<Vec<_>, _>>()?;

        let found = vectors.iter().flatten().map(Vec::len).next();
        let Some(dimensions) = found.or(fallback_width) else {
            return Ok(None);
        };

        let mut matrix = VectorMatrix::with_capacity(dimensions, vectors.len());
        for vector in &vectors {
            match vector {
                Some(v) => matrix.push_row(v)?,
                None => matrix.push_nan_row(),
            }
        }
        Ok(Some(matrix))
    }

    /// Write every group to `<dir>/<group>.idx`, creating `dir` if needed.
    ///
    /// Each file is replaced atomically; the directory as a whole is not.
    /// Returns the number of groups written.
    pub fn persist(&self, dir: impl AsRef<Path>) -> Result<usize, VectorError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        for (group, index) in &self.groups {
            let path = group_file(dir, group)?;
            index.save(&path)?;
        }

        info!(path = ?dir, groups = self.groups.len(), "Persisted store");
        Ok(self.groups.len())
    }

    /// Load every `<group>.idx` file in `dir`, replacing same-named groups.
    ///
    /// Groups not on disk stay as they are. A missing directory loads nothing.
    /// Returns the reloaded group names, sorted.
    pub fn reload(&mut self, dir: impl AsRef<Path>) -> Result<Vec<String>, VectorError> {
        let dir = dir.as_ref();
        let files = match index_files(dir) {
            Ok(files) => files,
            Err(VectorError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?dir, "Store directory does not exist, nothing to reload");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let mut loaded = Vec::with_capacity(files.len());
        for (group, path) in files {
            let index = I::load(&path)?;
            if self.groups.insert(group.clone(), index).is_some() {
                debug!(group = %group, "Replaced in-memory group from disk");
            }
            loaded.push(group);
        }

        info!(path = ?dir, groups = loaded.len(), "Reloaded store");
        Ok(loaded)
    }
}

/// `(group, path)` for every index file in `dir`, sorted by group name.
fn index_files(dir: &Path) -> Result<Vec<(String, PathBuf)>, VectorError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(group) = name.to_str().and_then(|n| n.strip_suffix(INDEX_SUFFIX)) else {
            continue;
        };
        if group.is_empty() {
            continue;
        }
        files.push((group.to_string(), entry.path()));
    }
    files.sort();
    Ok(files)
}

/// Path of a group's index file. The group name must be a plain file name.
fn group_file(dir: &Path, group: &str) -> Result<PathBuf, VectorError> {
    let mut components = Path::new(group).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == group => {
            Ok(dir.join(format!("{group}{INDEX_SUFFIX}")))
        }
        _ => Err(VectorError::InvalidGroupName(group.to_string())),
    }
}
