//! Resolution engine
//!
//! Collects every constraint reachable from a root request, then selects one
//! version per package that satisfies all of them. Conflicts are gathered for
//! every package before failing, never just the first one.
//!
//! The walk only ever adds rows, so a package expanded at a candidate that was
//! later replaced leaves its rows behind. After selection the answer keeps only
//! what the root reaches through the selected versions' own dependencies.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use sprout_core::error::SproutError;
use sprout_core::types::{Conflict, Constraint, Requirement, ResolvedVersionMap, ROOT_REQUIRER};
use sprout_registry::{Registry, RegistrySnapshot};
use tracing::{debug, info, warn};

use crate::collect::{Collector, RequirementSet};
use crate::select::VersionSelector;
use crate::ResolverResult;

/// Dependency resolver over a shared registry
///
/// The resolver holds no per-call state; every `resolve` works on its own
/// registry snapshot, so concurrent calls do not interfere.
#[derive(Debug, Clone)]
pub struct Resolver {
    registry: Arc<Registry>,
}

/// Result of dependency resolution
#[derive(Debug, Clone)]
pub struct ResolutionResult {
    /// Selected version per package, root included
    pub versions: ResolvedVersionMap,
    /// Rows collected during the walk
    pub requirements: RequirementSet,
    /// Total number of packages resolved
    pub package_count: usize,
    /// Resolution time in milliseconds
    pub resolution_time_ms: u64,
}

impl Resolver {
    /// Create a new resolver reading from `registry`
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Registry this resolver reads from
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Resolve `root` and everything it transitively requires
    pub fn resolve(
        &self,
        root: &str,
        constraint: Option<Constraint>,
    ) -> ResolverResult<ResolvedVersionMap> {
        self.resolve_detailed(root, constraint)
            .map(|result| result.versions)
    }

    /// Resolve with the root constraint in textual form; `""` and `*` mean any version
    pub fn resolve_str(
        &self,
        root: &str,
        constraint: Option<&str>,
    ) -> ResolverResult<ResolvedVersionMap> {
        let constraint = constraint
            .map(Constraint::parse_optional)
            .transpose()?
            .flatten();
        self.resolve(root, constraint)
    }

    /// Resolve and keep the collected requirements and timing
    pub fn resolve_detailed(
        &self,
        root: &str,
        constraint: Option<Constraint>,
    ) -> ResolverResult<ResolutionResult> {
        let snapshot = self.registry.snapshot();
        resolve_snapshot(&snapshot, root, constraint)
    }
}

/// Resolve `root` against a fixed registry snapshot
pub fn resolve_snapshot(
    registry: &RegistrySnapshot,
    root: &str,
    constraint: Option<Constraint>,
) -> ResolverResult<ResolutionResult> {
    let start_time = Instant::now();

    if !registry.contains(root) {
        return Err(SproutError::UnknownPackage {
            name: root.to_string(),
        });
    }

    let requirements = Collector::new(registry).collect(root, constraint)?;

    let versions = select_versions(registry, &requirements).map_err(|conflicts| {
        for conflict in &conflicts {
            warn!(%conflict, "unsatisfiable requirements");
        }
        SproutError::ResolutionConflict { conflicts }
    })?;

    let resolution_time_ms = start_time.elapsed().as_millis() as u64;
    info!(
        root,
        packages = versions.len(),
        elapsed_ms = resolution_time_ms,
        "resolution finished"
    );

    Ok(ResolutionResult {
        package_count: versions.len(),
        versions,
        requirements,
        resolution_time_ms,
    })
}

/// Pick, for every collected package, the highest version accepted by all rows.
///
/// Packages the root no longer reaches through the selected versions are left
/// out, conflicting or not. Returns every conflicting package, in discovery
/// order, if a reachable package has no such version.
pub fn select_versions(
    registry: &RegistrySnapshot,
    requirements: &RequirementSet,
) -> Result<ResolvedVersionMap, Vec<Conflict>> {
    let mut versions = ResolvedVersionMap::new();
    let mut unsatisfied = Vec::new();

    for (package, rows) in requirements.iter() {
        match VersionSelector::new(registry.versions_of(package)).select_best(rows) {
            Some(version) => {
                versions.insert(package, version.clone());
            },
            None => unsatisfied.push(package),
        }
    }

    let reachable = requirements
        .root()
        .map(|root| reachable_packages(registry, root, &versions))
        .unwrap_or_default();

    if unsatisfied.iter().any(|package| reachable.contains(*package)) {
        return Err(unsatisfied
            .into_iter()
            .map(|package| {
                let rows = requirements.get(package);
                let superseded = rows
                    .iter()
                    .filter(|row| is_superseded(registry, &versions, package, row))
                    .cloned()
                    .collect();
                Conflict::new(package.to_string(), rows.to_vec()).with_superseded(superseded)
            })
            .collect());
    }

    for package in unsatisfied {
        debug!(package, "dropping conflict only a replaced candidate required");
    }
    Ok(versions
        .into_iter()
        .filter(|(name, _)| {
            let keep = reachable.contains(name.as_str());
            if !keep {
                debug!(package = %name, "dropping package only a replaced candidate required");
            }
            keep
        })
        .collect())
}

/// Packages reached from `root` through the dependencies of selected versions
fn reachable_packages(
    registry: &RegistrySnapshot,
    root: &str,
    versions: &ResolvedVersionMap,
) -> HashSet<String> {
    let mut reachable = HashSet::new();
    let mut pending = vec![root.to_string()];

    while let Some(package) = pending.pop() {
        if reachable.contains(&package) {
            continue;
        }
        // Unsatisfied packages are reached but have nothing to follow
        if let Some(version) = versions.get(&package) {
            for dependency in registry.dependencies_of(&package, version) {
                if !reachable.contains(&dependency.name) {
                    pending.push(dependency.name.clone());
                }
            }
        }
        reachable.insert(package);
    }

    reachable
}

/// Check if `row` on `package` was declared only by a replaced version of its requirer
fn is_superseded(
    registry: &RegistrySnapshot,
    versions: &ResolvedVersionMap,
    package: &str,
    row: &Requirement,
) -> bool {
    if row.requirer == ROOT_REQUIRER {
        return false;
    }
    versions.get(&row.requirer).is_some_and(|version| {
        !registry
            .dependencies_of(&row.requirer, version)
            .iter()
            .any(|dependency| dependency.name == package && dependency.constraint == row.constraint)
    })
}
