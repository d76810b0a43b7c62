//! Text codec for resolved version maps
//!
//! The format is one `name == version` pair per line, packages in ascending
//! name order. Decoding skips blank lines and tolerates extra whitespace around
//! the separator; anything else that does not match is rejected with its
//! 1-based line number. Both directions accept only valid package names, so
//! anything `encode` writes decodes back to the same map.

use std::fmt::Write as _;

use sprout_core::error::SproutError;
use sprout_core::types::{
    is_valid_package_name, validate_package_name, ResolvedVersionMap, Version,
};
use tracing::debug;

use crate::LockfileResult;

/// Separator between name and version on a lockfile line
pub const LOCK_SEPARATOR: &str = "==";

/// Encode a resolved map as lockfile text
pub fn encode(versions: &ResolvedVersionMap) -> LockfileResult<String> {
    let mut text = String::new();
    // ResolvedVersionMap iterates in ascending name order
    for (name, version) in versions {
        validate_package_name(name)?;
        let _ = writeln!(text, "{name} {LOCK_SEPARATOR} {version}");
    }
    Ok(text)
}

/// Decode lockfile text back into a resolved map
pub fn decode(text: &str) -> LockfileResult<ResolvedVersionMap> {
    let mut versions = ResolvedVersionMap::new();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        if raw.trim().is_empty() {
            continue;
        }

        let (name, version) = parse_line(raw).ok_or_else(|| SproutError::MalformedLockfile {
            line,
            content: raw.to_string(),
        })?;

        if versions.contains(name) {
            return Err(SproutError::DuplicateLockEntry {
                name: name.to_string(),
                line,
            });
        }
        versions.insert(name, version);
    }

    debug!(packages = versions.len(), "decoded lockfile");
    Ok(versions)
}

fn parse_line(raw: &str) -> Option<(&str, Version)> {
    let (name, version) = raw.split_once(LOCK_SEPARATOR)?;
    let name = name.trim();
    if !is_valid_package_name(name) {
        return None;
    }

    let version = Version::parse(version.trim()).ok()?;
    Some((name, version))
}
