//! Install ledger guarded by a single reader-writer lock

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sprout_core::error::SproutError;
use sprout_core::types::{Constraint, ResolvedVersionMap, Version};
use sprout_registry::{Registry, RegistrySnapshot};
use tracing::debug;

use crate::LedgerResult;

/// One installed package and the installed packages that depend on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledPackage {
    pub name: String,
    pub version: Version,
    /// Names of installed packages whose installed version depends on this one
    pub dependents: BTreeSet<String>,
}

/// Newer published version available for an installed package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSuggestion {
    pub name: String,
    pub current: Version,
    pub latest: Version,
    /// The leading component increases
    pub breaking: bool,
}

/// Installed state, with dependency edges read from the registry
#[derive(Debug)]
pub struct InstallLedger {
    registry: Arc<Registry>,
    packages: RwLock<HashMap<String, InstalledPackage>>,
}

impl InstalledPackage {
    /// Create a record with no dependents
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
            dependents: BTreeSet::new(),
        }
    }
}

impl InstallLedger {
    /// Create an empty ledger reading dependency edges from `registry`
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            packages: RwLock::new(HashMap::new()),
        }
    }

    /// Install every (name, version) pair of `versions`.
    ///
    /// A reinstalled package keeps its dependents; its own dependency edges
    /// are recomputed from the new version. Edges are recorded only between
    /// installed packages, in both directions: a new package is linked to its
    /// installed dependencies and to the installed packages that need it.
    pub fn install(&self, versions: &ResolvedVersionMap) {
        let registry = self.registry.snapshot();
        let mut packages = self.packages.write();

        for (name, version) in versions {
            match packages.get_mut(name) {
                Some(existing) => {
                    debug!(
                        package = %name,
                        from = %existing.version,
                        to = %version,
                        "reinstalling package"
                    );
                    existing.version = version.clone();
                },
                None => {
                    debug!(package = %name, version = %version, "installing package");
                    packages.insert(
                        name.clone(),
                        InstalledPackage::new(name.as_str(), version.clone()),
                    );
                },
            }
        }

        // Outgoing edges of reinstalled packages are rebuilt from scratch
        for record in packages.values_mut() {
            record.dependents.retain(|dependent| !versions.contains(dependent));
        }

        let edges: Vec<(String, String)> = packages
            .values()
            .flat_map(|record| {
                registry
                    .dependencies_of(&record.name, &record.version)
                    .iter()
                    .map(move |dependency| (record.name.clone(), dependency.name.clone()))
            })
            .filter(|(dependent, dependency)| {
                dependent != dependency
                    && (versions.contains(dependent) || versions.contains(dependency))
            })
            .collect();

        for (dependent, dependency) in edges {
            if let Some(record) = packages.get_mut(&dependency) {
                record.dependents.insert(dependent);
            }
        }
    }

    /// Remove `name` from the ledger.
    ///
    /// Fails without changing anything if another installed package depends on
    /// it; the error lists those packages in name order.
    pub fn uninstall(&self, name: &str) -> LedgerResult<InstalledPackage> {
        let mut packages = self.packages.write();

        let record = packages.get(name).ok_or_else(|| SproutError::NotInstalled {
            name: name.to_string(),
        })?;

        if !record.dependents.is_empty() {
            return Err(SproutError::HasDependents {
                name: name.to_string(),
                blockers: record.dependents.iter().cloned().collect(),
            });
        }

        let removed = packages.remove(name).ok_or_else(|| SproutError::NotInstalled {
            name: name.to_string(),
        })?;
        for other in packages.values_mut() {
            other.dependents.remove(name);
        }

        debug!(package = %name, version = %removed.version, "uninstalled package");
        Ok(removed)
    }

    /// Check if `name` is installed
    pub fn is_installed(&self, name: &str) -> bool {
        self.packages.read().contains_key(name)
    }

    /// Installed version of `name`
    pub fn installed_version(&self, name: &str) -> Option<Version> {
        self.packages.read().get(name).map(|record| record.version.clone())
    }

    /// Installed packages that depend on `name`; empty if not installed
    pub fn dependents_of(&self, name: &str) -> BTreeSet<String> {
        self.packages
            .read()
            .get(name)
            .map(|record| record.dependents.clone())
            .unwrap_or_default()
    }

    /// Full record for `name`
    pub fn get(&self, name: &str) -> Option<InstalledPackage> {
        self.packages.read().get(name).cloned()
    }

    /// Installed (name, version) pairs in name order
    pub fn list_packages(&self) -> Vec<(String, Version)> {
        self.snapshot().into_iter().collect()
    }

    /// Check if the installed version of `name` matches `constraint`
    pub fn satisfies(&self, name: &str, constraint: &Constraint) -> bool {
        self.packages
            .read()
            .get(name)
            .is_some_and(|record| constraint.matches(&record.version))
    }

    /// Installed state as a version map, ready to be written as a lockfile
    pub fn snapshot(&self) -> ResolvedVersionMap {
        self.packages
            .read()
            .values()
            .map(|record| (record.name.clone(), record.version.clone()))
            .collect()
    }

    /// Installed packages with a newer published version, in name order
    pub fn outdated(&self) -> Vec<UpdateSuggestion> {
        let registry = self.registry.snapshot();
        self.snapshot()
            .into_iter()
            .filter_map(|(name, current)| update_for(&registry, name, current))
            .collect()
    }

    /// Number of installed packages
    pub fn len(&self) -> usize {
        self.packages.read().len()
    }

    /// Check if nothing is installed
    pub fn is_empty(&self) -> bool {
        self.packages.read().is_empty()
    }
}

fn update_for(
    registry: &RegistrySnapshot,
    name: String,
    current: Version,
) -> Option<UpdateSuggestion> {
    let latest = registry.versions_of(&name).last()?.clone();
    if latest <= current {
        return None;
    }

    Some(UpdateSuggestion {
        breaking: latest.leading() > current.leading(),
        name,
        current,
        latest,
    })
}
