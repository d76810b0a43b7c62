//! # sprout
//!
//! Package dependency resolver with deterministic lockfiles.
//!
//! [`PackageManager`] is the entry point: register packages, resolve a root
//! request into one version per package, install the result into the ledger
//! in dependency order, and record it as a lockfile that can be reinstalled
//! later without resolving again.

pub mod logging;
pub mod manager;
pub mod outcome;
pub mod output;

// Re-export main types
pub use manager::PackageManager;
pub use outcome::{ConflictReport, ResolveOutcome, Status, UninstallOutcome};

pub use sprout_config::{ConfigLoader, ConfigSource, LoadedConfig, SproutToml};
pub use sprout_core::error::{SproutError, SproutResult};
pub use sprout_core::types::{Constraint, ResolvedVersionMap, Version};
pub use sprout_ledger::{InstalledPackage, UpdateSuggestion};
pub use sprout_registry::Registry;
