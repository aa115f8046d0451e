//! seek: inspect and populate grouped vector store directories.
//!
//! # Usage
//!
//! ```bash
//! seek groups [--dir DIR]
//! seek fetch [--dir DIR] GROUP ID...
//! seek import [--dir DIR] GROUP FILE [--space SPACE] [--ef-construction N]
//! seek config
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/seek-store/config.toml)
//! 3. Environment variables (SEEK_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use seek_cli::{
    handle_fetch, handle_groups, handle_import, init_logging, load_settings, show_config, Cli,
    Commands,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref(), cli.log_level.as_deref())?;
    init_logging(&settings)?;

    match cli.command {
        Commands::Groups { dir } => {
            handle_groups(&settings, dir.as_deref())?;
        }
        Commands::Fetch { dir, group, ids } => {
            handle_fetch(&settings, dir.as_deref(), &group, &ids)?;
        }
        Commands::Import {
            dir,
            group,
            file,
            space,
            ef_construction,
        } => {
            handle_import(
                &settings,
                dir.as_deref(),
                &group,
                &file,
                space.as_deref(),
                ef_construction,
            )?;
        }
        Commands::Config => {
            show_config(&settings)?;
        }
    }

    Ok(())
}
