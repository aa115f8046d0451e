//! seek CLI library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (groups, fetch, import, config)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{
    fetch_json, handle_fetch, handle_groups, handle_import, init_logging, load_settings,
    open_store, read_records, show_config,
};
