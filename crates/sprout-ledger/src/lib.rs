//! Installed-package ledger for Sprout
//!
//! Records which version of each package is installed and which installed
//! packages depend on it, so that uninstalling a package still needed by
//! another one can be refused.

pub mod ledger;

// Re-export main types
pub use ledger::{InstallLedger, InstalledPackage, UpdateSuggestion};

use sprout_core::error::SproutError;

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, SproutError>;
