//! Configuration loading for seek-store.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/seek-store/config.toml.

use std::path::PathBuf;

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::SeekError;
use crate::space::DistanceSpace;

/// Default index construction settings applied to newly created groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSettings {
    /// Distance space for new groups
    #[serde(default)]
    pub space: DistanceSpace,

    /// Build-time candidate list size (ef_construction)
    #[serde(default = "default_ef_construction")]
    pub ef_construction: usize,

    /// Edges per graph node (M parameter)
    #[serde(default = "default_connectivity")]
    pub connectivity: usize,

    /// Query-time candidate list size (ef_search)
    #[serde(default = "default_ef_search")]
    pub ef_search: usize,
}

fn default_ef_construction() -> usize {
    200
}

fn default_connectivity() -> usize {
    16
}

fn default_ef_search() -> usize {
    100
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            space: DistanceSpace::default(),
            ef_construction: default_ef_construction(),
            connectivity: default_connectivity(),
            ef_search: default_ef_search(),
        }
    }
}

impl IndexSettings {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.ef_construction == 0 {
            return Err("ef_construction must be > 0".to_string());
        }
        if self.connectivity < 2 {
            return Err(format!(
                "connectivity must be >= 2, got {}",
                self.connectivity
            ));
        }
        if self.ef_search == 0 {
            return Err("ef_search must be > 0".to_string());
        }
        Ok(())
    }
}

/// One eagerly loaded group.
///
/// Written as a `[[mapping]]` entry so the group name is a value, not a
/// table key; `config` lowercases keys, values keep their case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMapping {
    pub group: String,
    pub path: String,
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory holding one `<group>.idx` file per group
    #[serde(default = "default_store_dir")]
    pub store_dir: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Index construction defaults
    #[serde(default)]
    pub index: IndexSettings,

    /// Groups loaded eagerly at startup
    #[serde(default)]
    pub mapping: Vec<GroupMapping>,
}

fn default_store_dir() -> String {
    ProjectDirs::from("", "", "seek-store")
        .map(|p| p.data_local_dir().join("groups"))
        .unwrap_or_else(|| PathBuf::from("./groups"))
        .to_string_lossy()
        .to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            log_level: default_log_level(),
            index: IndexSettings::default(),
            mapping: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/seek-store/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (SEEK_*, nested keys joined with `__`)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, SeekError> {
        let config_dir = ProjectDirs::from("", "", "seek-store")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");
        let index = IndexSettings::default();

        let mut builder = Config::builder()
            .set_default("store_dir", default_store_dir())
            .map_err(|e| SeekError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| SeekError::Config(e.to_string()))?
            .set_default("index.space", index.space.as_str())
            .map_err(|e| SeekError::Config(e.to_string()))?
            .set_default("index.ef_construction", index.ef_construction as i64)
            .map_err(|e| SeekError::Config(e.to_string()))?
            .set_default("index.connectivity", index.connectivity as i64)
            .map_err(|e| SeekError::Config(e.to_string()))?
            .set_default("index.ef_search", index.ef_search as i64)
            .map_err(|e| SeekError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // SEEK_LOG_LEVEL, SEEK_STORE_DIR, SEEK_INDEX__EF_CONSTRUCTION, ...
        builder = builder.add_source(
            Environment::with_prefix("SEEK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| SeekError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| SeekError::Config(e.to_string()))?;

        settings.index.validate().map_err(SeekError::Config)?;
        Ok(settings)
    }

    /// Expand ~ in store_dir to the home directory
    pub fn expanded_store_dir(&self) -> PathBuf {
        expand_home(&self.store_dir)
    }

    /// Eager-load mapping with ~ expanded in every path
    pub fn expanded_mapping(&self) -> Vec<(String, PathBuf)> {
        self.mapping
            .iter()
            .map(|entry| (entry.group.clone(), expand_home(&entry.path)))
            .collect()
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
