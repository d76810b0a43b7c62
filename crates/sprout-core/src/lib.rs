//! # sprout-core
//!
//! Core types and utilities shared across all Sprout crates.
//!
//! This crate provides:
//! - Version ordering over dotted numeric version strings
//! - Constraint parsing and matching (`==`, `>=`, `<=`, `>`, `<`, `~=`)
//! - PackageSpec and Dependency types describing registry entries
//! - Requirement and Conflict types produced during resolution
//! - SproutError enum for unified error handling
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (Version, Constraint, PackageSpec, etc.)
//! - `error`: Error types and result aliases

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{SproutError, SproutResult};
pub use types::{
    Conflict, Constraint, Dependency, Op, PackageSpec, Requirement, ResolvedVersionMap, Version,
    ROOT_REQUIRER,
};
