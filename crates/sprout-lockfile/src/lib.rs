//! Lockfile support for Sprout
//!
//! A lockfile records one `name == version` line per resolved package, sorted
//! by name, so that a resolution can be reinstalled verbatim without running
//! the resolver again.

pub mod codec;
pub mod file;

// Re-export main types
pub use codec::{decode, encode, LOCK_SEPARATOR};
pub use file::{read_lockfile, write_lockfile, DEFAULT_LOCKFILE_NAME};

use sprout_core::error::SproutError;

/// Result type for lockfile operations
pub type LockfileResult<T> = Result<T, SproutError>;
