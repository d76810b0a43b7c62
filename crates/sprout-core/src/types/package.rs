//! Package specification types.
//!
//! Defines the registry entry for a package: its published versions and the
//! dependencies declared by each of them.

use std::collections::HashMap;

use super::{Constraint, Version};
use crate::error::{SproutError, SproutResult};

/// Dependency declared by one published version of a package
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
    pub name: String,
    /// `None` accepts any version of the dependency
    pub constraint: Option<Constraint>,
}

/// Registry entry for a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    name: String,
    /// Strictly ascending, no duplicates
    versions: Vec<Version>,
    dependencies: HashMap<Version, Vec<Dependency>>,
}

impl Dependency {
    /// Create a new dependency
    pub fn new(name: impl Into<String>, constraint: Option<Constraint>) -> Self {
        Self {
            name: name.into(),
            constraint,
        }
    }

    /// Create a dependency that accepts any version
    pub fn any(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }
}

impl PackageSpec {
    /// Create a package spec.
    ///
    /// Versions are sorted ascending and duplicates (including padded duplicates
    /// such as `1.0` and `1.0.0`) are collapsed.
    pub fn new(
        name: impl Into<String>,
        mut versions: Vec<Version>,
        dependencies: HashMap<Version, Vec<Dependency>>,
    ) -> Self {
        versions.sort();
        versions.dedup();
        Self {
            name: name.into(),
            versions,
            dependencies,
        }
    }

    /// Create a package spec without any dependencies
    pub fn leaf(name: impl Into<String>, versions: Vec<Version>) -> Self {
        Self::new(name, versions, HashMap::new())
    }

    /// Package name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Published versions, ascending
    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    /// Highest published version
    pub fn latest(&self) -> Option<&Version> {
        self.versions.last()
    }

    /// Check if `version` is published
    pub fn has_version(&self, version: &Version) -> bool {
        self.versions.binary_search(version).is_ok()
    }

    /// Dependencies of a published version; empty if unknown or none declared
    pub fn dependencies_of(&self, version: &Version) -> &[Dependency] {
        if !self.has_version(version) {
            return &[];
        }
        self.dependencies
            .get(version)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Check the package name and every declared dependency name
    pub fn validate_names(&self) -> SproutResult<()> {
        validate_package_name(&self.name)?;
        self.dependencies
            .values()
            .flatten()
            .try_for_each(|dependency| validate_package_name(&dependency.name))
    }

    /// Dependency keys that do not name a published version
    pub fn unpublished_dependency_keys(&self) -> Vec<&Version> {
        let mut keys: Vec<&Version> = self
            .dependencies
            .keys()
            .filter(|version| !self.has_version(version))
            .collect();
        keys.sort();
        keys
    }
}

/// Check if `name` can be registered and written to a lockfile.
///
/// Names start with an ASCII letter or digit and continue with letters,
/// digits, `-`, `_` or `.`.
pub fn is_valid_package_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_alphanumeric())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Reject names [`is_valid_package_name`] refuses
pub fn validate_package_name(name: &str) -> SproutResult<()> {
    if is_valid_package_name(name) {
        Ok(())
    } else {
        Err(SproutError::MalformedPackageName {
            name: name.to_string(),
        })
    }
}
