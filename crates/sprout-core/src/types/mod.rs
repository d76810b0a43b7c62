//! Core data types for Sprout package management.
//!
//! This module provides the fundamental types used throughout the Sprout ecosystem:
//! - Version types for dotted numeric versions
//! - Constraint types and the matching truth table
//! - Package specifications as stored in the registry
//! - Requirement rows and conflicts collected by the resolver

pub mod constraint;
pub mod package;
pub mod requirement;
pub mod version;

// Re-export all public types
pub use constraint::{Constraint, Op};
pub use package::{is_valid_package_name, validate_package_name, Dependency, PackageSpec};
pub use requirement::{Conflict, Requirement, ResolvedVersionMap, ROOT_REQUIRER};
pub use version::Version;
