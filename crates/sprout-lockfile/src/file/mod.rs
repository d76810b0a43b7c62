//! Reading and writing lockfiles on disk

use std::fs;

use camino::Utf8Path;
use sprout_core::error::SproutError;
use sprout_core::types::ResolvedVersionMap;
use tracing::info;

use crate::codec::{decode, encode};
use crate::LockfileResult;

/// Lockfile name used when the configuration does not set one
pub const DEFAULT_LOCKFILE_NAME: &str = "sprout.lock";

/// Read and decode the lockfile at `path`
pub fn read_lockfile(path: &Utf8Path) -> LockfileResult<ResolvedVersionMap> {
    let text = fs::read_to_string(path)
        .map_err(|e| SproutError::io(format!("Failed to read lockfile {path}"), e))?;
    decode(&text)
}

/// Encode `versions` and write them to `path`, replacing any existing file
pub fn write_lockfile(path: &Utf8Path, versions: &ResolvedVersionMap) -> LockfileResult<()> {
    let text = encode(versions)?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| SproutError::io(format!("Failed to create directory {parent}"), e))?;
    }

    fs::write(path, text)
        .map_err(|e| SproutError::io(format!("Failed to write lockfile {path}"), e))?;

    info!(path = %path, packages = versions.len(), "wrote lockfile");
    Ok(())
}
