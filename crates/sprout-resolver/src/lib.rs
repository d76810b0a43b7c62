//! Dependency resolution engine for Sprout
//!
//! This crate walks the registry from a root request, collects every
//! constraint placed on each reachable package, and selects one version per
//! package that satisfies all of them. Resolution either produces a complete
//! version map or the full list of conflicting packages.

pub mod collect;
pub mod graph;
pub mod resolver;
pub mod select;

// Re-export main types
pub use collect::{Collector, RequirementSet};
pub use graph::{DependencyEdge, DependencyGraph, PackageId};
pub use resolver::{resolve_snapshot, select_versions, ResolutionResult, Resolver};
pub use select::VersionSelector;

use sprout_core::error::SproutError;

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, SproutError>;
