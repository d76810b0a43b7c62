//! Configuration parsing for Sprout
//!
//! This crate reads `sprout.toml`: a `[settings]` table and a package catalog
//! that can be loaded into a registry. It also finds the file by walking up
//! from the working directory and layers global, environment and caller
//! overrides on top of it.

pub mod merge;
pub mod toml;

// Re-export main types
pub use merge::{ConfigLayering, ConfigLoader, ConfigSource, LoadedConfig};
pub use toml::{DependencyEntry, PackageEntry, Settings, SproutToml, CONFIG_FILE_NAME};

use sprout_core::error::SproutError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, SproutError>;
