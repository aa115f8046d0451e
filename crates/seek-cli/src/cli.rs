//! CLI argument parsing for the `seek` tool.
//!
//! CLI flags override all other config sources.

use clap::{Parser, Subcommand};

/// Grouped vector store tool
///
/// Inspect and populate a directory of per-group vector indexes.
#[derive(Parser, Debug)]
#[command(name = "seek")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/seek-store/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Tool commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List groups in a store directory
    Groups {
        /// Store directory (default from config)
        #[arg(long)]
        dir: Option<String>,
    },

    /// Print stored vectors as JSON
    Fetch {
        /// Store directory (default from config)
        #[arg(long)]
        dir: Option<String>,

        /// Group name
        group: String,

        /// Entity ids to fetch
        #[arg(required = true)]
        ids: Vec<u64>,
    },

    /// Insert vectors from a JSON-lines file and persist the store
    Import {
        /// Store directory (default from config)
        #[arg(long)]
        dir: Option<String>,

        /// Group name
        group: String,

        /// File with one {"id": .., "vector": [..]} object per line
        file: String,

        /// Distance space if the group is new (euclidean, cosine, inner_product)
        #[arg(long)]
        space: Option<String>,

        /// ef_construction if the group is new
        #[arg(long)]
        ef_construction: Option<usize>,
    },

    /// Print the effective configuration
    Config,
}
