//! In-memory package registry guarded by a single reader-writer lock

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use sprout_core::types::{Constraint, Dependency, PackageSpec, Version};
use tracing::debug;

use crate::RegistryResult;

/// Empty dependency table for `Registry::register_package`
pub const NO_DEPENDENCIES: [(&str, Vec<(&str, &str)>); 0] = [];

/// Package catalog keyed by package name
///
/// Writers (`register`) take the lock exclusively; queries share it. Entries are
/// stored behind `Arc` so a snapshot is a cheap copy of pointers.
#[derive(Debug, Default)]
pub struct Registry {
    packages: RwLock<HashMap<String, Arc<PackageSpec>>>,
}

/// Frozen, lock-free view of the registry taken at one point in time
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    packages: HashMap<String, Arc<PackageSpec>>,
}

/// Registry statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStats {
    /// Number of registered packages
    pub packages: usize,
    /// Number of published versions across all packages
    pub versions: usize,
    /// Number of declared (version, dependency) edges across all packages
    pub dependency_edges: usize,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package, replacing any prior entry wholesale.
    ///
    /// The package name and every dependency name must be valid package names,
    /// so everything the registry holds can be written to a lockfile.
    pub fn register(&self, spec: PackageSpec) -> RegistryResult<Option<Arc<PackageSpec>>> {
        spec.validate_names()?;

        let name = spec.name().to_string();
        debug!(package = %name, versions = spec.versions().len(), "registering package");

        let previous = self.packages.write().insert(name.clone(), Arc::new(spec));
        if previous.is_some() {
            debug!(package = %name, "replaced existing registry entry");
        }
        Ok(previous)
    }

    /// Register a package from its textual form.
    ///
    /// `dependencies` maps a version string to `(dependency name, constraint)`
    /// pairs; an empty or `*` constraint accepts any version. Nothing is
    /// registered if any name, version or constraint is malformed.
    pub fn register_package<V, K, D, N, C>(
        &self,
        name: &str,
        versions: &[V],
        dependencies: impl IntoIterator<Item = (K, D)>,
    ) -> RegistryResult<()>
    where
        V: AsRef<str>,
        K: AsRef<str>,
        D: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: AsRef<str>,
    {
        let versions = versions
            .iter()
            .map(|text| Version::parse(text.as_ref()))
            .collect::<RegistryResult<Vec<_>>>()?;

        let mut per_version: HashMap<Version, Vec<Dependency>> = HashMap::new();
        for (version, deps) in dependencies {
            let version = Version::parse(version.as_ref())?;
            let entry = per_version.entry(version).or_default();
            for (dep_name, constraint) in deps {
                let constraint = Constraint::parse_optional(constraint.as_ref())?;
                entry.push(Dependency::new(dep_name.as_ref(), constraint));
            }
        }

        self.register(PackageSpec::new(name, versions, per_version))?;
        Ok(())
    }

    /// Registry entry for `name`
    pub fn get(&self, name: &str) -> Option<Arc<PackageSpec>> {
        self.packages.read().get(name).cloned()
    }

    /// Check if `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.packages.read().contains_key(name)
    }

    /// Published versions of `name`, ascending; empty if unknown
    pub fn versions_of(&self, name: &str) -> Vec<Version> {
        self.get(name)
            .map(|spec| spec.versions().to_vec())
            .unwrap_or_default()
    }

    /// Dependencies of `name` at `version`; empty if unknown or none declared
    pub fn dependencies_of(&self, name: &str, version: &Version) -> Vec<Dependency> {
        self.get(name)
            .map(|spec| spec.dependencies_of(version).to_vec())
            .unwrap_or_default()
    }

    /// Highest published version of `name`
    pub fn latest_version(&self, name: &str) -> Option<Version> {
        self.get(name).and_then(|spec| spec.latest().cloned())
    }

    /// Highest published version of `name` satisfying `constraint`
    pub fn find_compatible(&self, name: &str, constraint: &Constraint) -> Option<Version> {
        self.get(name).and_then(|spec| {
            spec.versions()
                .iter()
                .rev()
                .find(|version| constraint.matches(version))
                .cloned()
        })
    }

    /// Registered package names in ascending order
    pub fn package_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.packages.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered packages
    pub fn len(&self) -> usize {
        self.packages.read().len()
    }

    /// Check if no packages are registered
    pub fn is_empty(&self) -> bool {
        self.packages.read().is_empty()
    }

    /// Get registry statistics
    pub fn stats(&self) -> RegistryStats {
        let packages = self.packages.read();
        let mut versions = 0;
        let mut dependency_edges = 0;

        for spec in packages.values() {
            versions += spec.versions().len();
            dependency_edges += spec
                .versions()
                .iter()
                .map(|version| spec.dependencies_of(version).len())
                .sum::<usize>();
        }

        RegistryStats {
            packages: packages.len(),
            versions,
            dependency_edges,
        }
    }

    /// Take a consistent view of the whole registry
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            packages: self.packages.read().clone(),
        }
    }
}

impl RegistrySnapshot {
    /// Check if `name` is present in the snapshot
    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    /// Entry for `name`
    pub fn get(&self, name: &str) -> Option<&PackageSpec> {
        self.packages.get(name).map(Arc::as_ref)
    }

    /// Published versions of `name`, ascending; empty if unknown
    pub fn versions_of(&self, name: &str) -> &[Version] {
        self.get(name).map(PackageSpec::versions).unwrap_or(&[])
    }

    /// Dependencies of `name` at `version`; empty if unknown or none declared
    pub fn dependencies_of(&self, name: &str, version: &Version) -> &[Dependency] {
        self.get(name)
            .map(|spec| spec.dependencies_of(version))
            .unwrap_or(&[])
    }

    /// Number of packages in the snapshot
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Check if the snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

#[cfg(test)]
mod tests;
