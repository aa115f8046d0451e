//! Command implementations for the `seek` tool.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use seek_store::{GroupedVectorStore, HnswIndex, IndexOverrides, VectorMatrix};
use seek_types::{DistanceSpace, Settings};

/// One line of an import file
#[derive(Debug, Deserialize)]
pub struct VectorRecord {
    pub id: u64,
    pub vector: Vec<f32>,
}

/// Load settings and apply the CLI log level override.
pub fn load_settings(config_path: Option<&str>, log_level: Option<&str>) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(level) = log_level {
        settings.log_level = level.to_string();
    }
    Ok(settings)
}

/// Install the global tracing subscriber. Logs go to stderr.
pub fn init_logging(settings: &Settings) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

fn store_dir(settings: &Settings, dir_override: Option<&str>) -> PathBuf {
    dir_override
        .map(PathBuf::from)
        .unwrap_or_else(|| settings.expanded_store_dir())
}

/// Build a store from settings, then reload everything under `dir`.
pub fn open_store(settings: &Settings, dir: &Path) -> Result<GroupedVectorStore<HnswIndex>> {
    let mut store =
        GroupedVectorStore::from_settings(settings).context("Failed to load mapped groups")?;
    store
        .reload(dir)
        .with_context(|| format!("Failed to reload store from {}", dir.display()))?;
    Ok(store)
}

/// List groups with their size, dimensionality and space.
pub fn handle_groups(settings: &Settings, dir: Option<&str>) -> Result<()> {
    let dir = store_dir(settings, dir);
    let store = open_store(settings, &dir)?;

    if store.is_empty() {
        println!("No groups in {}", dir.display());
        return Ok(());
    }

    println!("{:<24} {:>10} {:>6}  SPACE", "GROUP", "VECTORS", "DIM");
    for group in store.groups() {
        let stats = store.stats(group)?;
        println!(
            "{:<24} {:>10} {:>6}  {}",
            group, stats.vector_count, stats.dimensions, stats.space
        );
    }
    Ok(())
}

/// Print vectors for `ids` as JSON.
pub fn handle_fetch(
    settings: &Settings,
    dir: Option<&str>,
    group: &str,
    ids: &[u64],
) -> Result<()> {
    let dir = store_dir(settings, dir);
    let store = open_store(settings, &dir)?;
    let value = fetch_json(&store, group, ids)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

/// Fetch as JSON: a vector (or null) for one id, a matrix for several.
///
/// Rows for ids absent from the group are `null`; a batch with no hits is
/// `null`. Absence is checked against the group, not the NaN fill, so a
/// stored NaN vector stays an array.
pub fn fetch_json(
    store: &GroupedVectorStore<HnswIndex>,
    group: &str,
    ids: &[u64],
) -> Result<Value> {
    if let [id] = ids {
        let vector = store.fetch(group, *id)?;
        return Ok(serde_json::to_value(vector)?);
    }

    let Some(matrix) = store.fetch_batch(group, ids)? else {
        return Ok(Value::Null);
    };
    let mut rows = Vec::with_capacity(ids.len());
    for (&id, row) in ids.iter().zip(matrix.iter_rows()) {
        let value = if store.contains(group, id)? {
            serde_json::to_value(row)?
        } else {
            Value::Null
        };
        rows.push(value);
    }
    Ok(Value::Array(rows))
}

/// Read a JSON-lines import file into ids and a vector matrix.
pub fn read_records(path: &Path) -> Result<(Vec<u64>, VectorMatrix)> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut ids = Vec::new();
    let mut vectors: Option<VectorMatrix> = None;

    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: VectorRecord = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: invalid record", path.display(), line_no + 1))?;
        let matrix = vectors.get_or_insert_with(|| VectorMatrix::new(record.vector.len()));
        matrix.push_row(&record.vector).with_context(|| {
            format!("{}:{}: inconsistent vector length", path.display(), line_no + 1)
        })?;
        ids.push(record.id);
    }

    match vectors {
        Some(matrix) => Ok((ids, matrix)),
        None => bail!("{} contains no records", path.display()),
    }
}

/// Insert vectors from a file into `group` and persist the store.
pub fn handle_import(
    settings: &Settings,
    dir: Option<&str>,
    group: &str,
    file: &str,
    space: Option<&str>,
    ef_construction: Option<usize>,
) -> Result<()> {
    let dir = store_dir(settings, dir);
    let mut store = open_store(settings, &dir)?;

    let mut overrides = IndexOverrides::default();
    if let Some(space) = space {
        overrides = overrides.with_space(space.parse::<DistanceSpace>()?);
    }
    if let Some(ef) = ef_construction {
        overrides = overrides.with_ef_construction(ef);
    }

    let (ids, vectors) = read_records(Path::new(file))?;
    debug!(group = %group, count = ids.len(), dim = vectors.dimensions(), "Read import file");

    store
        .insert_batch_with_config(group, &ids, &vectors, &overrides)
        .with_context(|| format!("Failed to insert into group {group}"))?;
    store
        .persist(&dir)
        .with_context(|| format!("Failed to persist store to {}", dir.display()))?;

    info!(group = %group, count = ids.len(), "Import complete");
    println!("Imported {} vectors into {}", ids.len(), group);
    Ok(())
}

/// Print the effective configuration as TOML.
pub fn show_config(settings: &Settings) -> Result<()> {
    let rendered = toml::to_string_pretty(settings).context("Failed to render configuration")?;
    print!("{rendered}");
    Ok(())
}
