//! Error types and result aliases for Sprout operations.
//!
//! Provides a unified error type that covers all possible error conditions
//! across the Sprout ecosystem with actionable error messages.

use thiserror::Error;

use crate::types::Conflict;

/// Unified error type for all Sprout operations
#[derive(Error, Debug)]
pub enum SproutError {
    // Parse errors
    #[error("Malformed version '{input}': component '{component}' is not a non-negative integer")]
    MalformedVersion { input: String, component: String },

    #[error("Malformed constraint '{input}': {reason}")]
    MalformedConstraint { input: String, reason: String },

    #[error("Invalid package name '{name}'")]
    MalformedPackageName { name: String },

    // Registry errors
    #[error("Package '{name}' not found in registry")]
    UnknownPackage { name: String },

    // Resolution errors
    #[error(
        "Unsatisfiable constraints for {} package(s): {}",
        .conflicts.len(),
        render_conflicts(.conflicts)
    )]
    ResolutionConflict { conflicts: Vec<Conflict> },

    // Lockfile errors
    #[error("Malformed lockfile at line {line}: expected 'name == version', got '{content}'")]
    MalformedLockfile { line: usize, content: String },

    #[error("Duplicate lockfile entry for '{name}' at line {line}")]
    DuplicateLockEntry { name: String, line: usize },

    // Ledger errors
    #[error("Cannot uninstall '{name}': required by {}", .blockers.join(", "))]
    HasDependents { name: String, blockers: Vec<String> },

    #[error("Package '{name}' is not installed")]
    NotInstalled { name: String },

    // Config errors
    #[error("Failed to parse sprout.toml: {message}")]
    ConfigParse { message: String },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for Sprout operations
pub type SproutResult<T> = Result<T, SproutError>;

fn render_conflicts(conflicts: &[Conflict]) -> String {
    conflicts
        .iter()
        .map(|conflict| conflict.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl SproutError {
    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Stable machine-readable code for this error
    pub fn kind(&self) -> &'static str {
        match self {
            SproutError::MalformedVersion { .. } => "malformed-version",
            SproutError::MalformedConstraint { .. } => "malformed-constraint",
            SproutError::MalformedPackageName { .. } => "malformed-package-name",
            SproutError::UnknownPackage { .. } => "unknown-package",
            SproutError::ResolutionConflict { .. } => "resolution-conflict",
            SproutError::MalformedLockfile { .. } => "malformed-lockfile",
            SproutError::DuplicateLockEntry { .. } => "duplicate-lock-entry",
            SproutError::HasDependents { .. } => "has-dependents",
            SproutError::NotInstalled { .. } => "not-installed",
            SproutError::ConfigParse { .. } => "config-parse",
            SproutError::ConfigValidation { .. } => "config-validation",
            SproutError::Io { .. } => "io",
        }
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            SproutError::MalformedVersion { .. } => {
                Some("Versions are dot-separated non-negative integers, e.g. 2.28.0")
            },
            SproutError::MalformedConstraint { .. } => {
                Some("Use one of ==, >=, <=, >, <, ~= followed by a version, e.g. >=1.0.0")
            },
            SproutError::MalformedPackageName { .. } => {
                Some("Rename the package, e.g. my-package instead of 'my package'")
            },
            SproutError::UnknownPackage { .. } => {
                Some("Check the package name spelling or register the package first")
            },
            SproutError::ResolutionConflict { .. } => {
                Some("Relax the listed constraints or publish a version that satisfies all of them")
            },
            SproutError::MalformedLockfile { .. } | SproutError::DuplicateLockEntry { .. } => {
                Some("Regenerate the lockfile from a fresh resolution")
            },
            SproutError::HasDependents { .. } => {
                Some("Uninstall the listed dependents first")
            },
            _ => None,
        }
    }
}
