//! Package registry for the Sprout package manager
//!
//! This crate holds the in-memory catalog the resolver reads from: for each
//! package name, its ascending list of published versions and the dependencies
//! declared by each version. Storage and transport of the catalog are left to
//! the caller; see `sprout-config` for loading one from `sprout.toml`.

pub mod registry;

// Re-export main types
pub use registry::{Registry, RegistrySnapshot, RegistryStats, NO_DEPENDENCIES};

use sprout_core::error::SproutError;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, SproutError>;
