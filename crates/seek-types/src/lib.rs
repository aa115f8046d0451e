//! # seek-types
//!
//! Shared domain types for seek-store.
//!
//! - `DistanceSpace`: metric a group index is built with
//! - `Settings`: layered configuration (defaults, config file, env vars)
//! - `SeekError`: configuration errors

pub mod config;
pub mod error;
pub mod space;

pub use config::{GroupMapping, IndexSettings, Settings};
pub use error::SeekError;
pub use space::DistanceSpace;
