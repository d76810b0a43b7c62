//! Constraint collection over the dependency graph
//!
//! Walks from the root request through the registry, expanding each package at
//! its current best candidate (the highest version consistent with the rows
//! seen so far) and attributing every discovered constraint to the package
//! that declared it.
//!
//! Termination rests on two guards:
//! - a row already present for a package, meaning the same (package, requirer,
//!   constraint), is never walked again;
//! - a package that is being expanded further up the call chain only records
//!   the new row. Its own expansion loop notices if the best candidate moved
//!   and re-expands it once the current pass returns.
//!
//! Every non-trivial visit adds a distinct row, and rows are drawn from the
//! finite set of declared dependencies, so the walk is bounded even on cycles.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use sprout_core::error::SproutError;
use sprout_core::types::{Constraint, Requirement, Version, ROOT_REQUIRER};
use sprout_registry::RegistrySnapshot;
use tracing::{debug, trace};

use crate::select::VersionSelector;
use crate::ResolverResult;

/// Requirement rows accumulated per package, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementSet {
    rows: IndexMap<String, Vec<Requirement>>,
}

impl RequirementSet {
    /// Create an empty requirement set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row for `package`; returns false if the identical row already exists
    pub fn add(&mut self, package: &str, requirement: Requirement) -> bool {
        let rows = self.rows.entry(package.to_string()).or_default();
        if rows.contains(&requirement) {
            return false;
        }
        rows.push(requirement);
        true
    }

    /// Rows collected for `package`
    pub fn get(&self, package: &str) -> &[Requirement] {
        self.rows.get(package).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check if `package` was reached by the walk
    pub fn contains(&self, package: &str) -> bool {
        self.rows.contains_key(package)
    }

    /// Package the walk started from
    pub fn root(&self) -> Option<&str> {
        self.rows.keys().next().map(String::as_str)
    }

    /// Packages in the order they were first reached
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    /// (package, rows) pairs in discovery order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Requirement])> {
        self.rows
            .iter()
            .map(|(name, rows)| (name.as_str(), rows.as_slice()))
    }

    /// Number of packages reached
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if no package was reached
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Per-call walk state; discarded once the requirement set is returned
#[derive(Debug)]
pub struct Collector<'a> {
    registry: &'a RegistrySnapshot,
    requirements: RequirementSet,
    /// Version each package's dependencies were last read from
    expanded: HashMap<String, Version>,
    /// Packages on the active expansion chain
    in_progress: HashSet<String>,
}

impl<'a> Collector<'a> {
    /// Create a collector over a registry snapshot
    pub fn new(registry: &'a RegistrySnapshot) -> Self {
        Self {
            registry,
            requirements: RequirementSet::new(),
            expanded: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    /// Walk the graph from `root` and return every row collected
    pub fn collect(
        mut self,
        root: &str,
        constraint: Option<Constraint>,
    ) -> ResolverResult<RequirementSet> {
        self.visit(root, Requirement::new(ROOT_REQUIRER, constraint))?;
        Ok(self.requirements)
    }

    fn visit(&mut self, package: &str, requirement: Requirement) -> ResolverResult<()> {
        if !self.registry.contains(package) {
            return Err(SproutError::UnknownPackage {
                name: package.to_string(),
            });
        }

        if !self.requirements.add(package, requirement) {
            trace!(package, "requirement already recorded");
            return Ok(());
        }

        if self.in_progress.contains(package) {
            debug!(package, "cycle detected, deferring to active expansion");
            return Ok(());
        }

        self.expand(package)
    }

    fn expand(&mut self, package: &str) -> ResolverResult<()> {
        self.in_progress.insert(package.to_string());
        let result = self.expand_until_stable(package);
        self.in_progress.remove(package);
        result
    }

    /// Expand at the best candidate until the candidate stops moving
    fn expand_until_stable(&mut self, package: &str) -> ResolverResult<()> {
        let registry = self.registry;

        loop {
            let Some(candidate) = self.best_candidate(package) else {
                debug!(package, "no version satisfies the rows seen so far");
                return Ok(());
            };

            if self.expanded.get(package) == Some(candidate) {
                return Ok(());
            }

            debug!(package, version = %candidate, "expanding dependencies");
            self.expanded.insert(package.to_string(), candidate.clone());

            for dependency in registry.dependencies_of(package, candidate) {
                self.visit(
                    &dependency.name,
                    Requirement::new(package, dependency.constraint.clone()),
                )?;
            }
        }
    }

    fn best_candidate(&self, package: &str) -> Option<&'a Version> {
        VersionSelector::new(self.registry.versions_of(package))
            .select_best(self.requirements.get(package))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprout_registry::{Registry, NO_DEPENDENCIES};

    fn collect(registry: &Registry, root: &str) -> ResolverResult<RequirementSet> {
        let snapshot = registry.snapshot();
        Collector::new(&snapshot).collect(root, None)
    }

    fn rows(set: &RequirementSet, package: &str) -> Vec<String> {
        set.get(package).iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_requirement_set_deduplicates_rows() {
        let mut set = RequirementSet::new();
        let row = Requirement::new("app", Some(Constraint::parse(">=1").unwrap()));

        assert!(set.add("base", row.clone()));
        assert!(!set.add("base", row));
        assert!(set.add("base", Requirement::new("app", None)));
        assert_eq!(set.get("base").len(), 2);
        assert!(set.get("other").is_empty());
    }

    #[test]
    fn test_collects_attributed_rows() {
        let registry = Registry::new();
        registry
            .register_package("base", &["1.0.0", "1.5.0", "2.0.0"], NO_DEPENDENCIES)
            .unwrap();
        registry
            .register_package("pkg1", &["1.0.0"], [("1.0.0", vec![("base", ">=1.0.0")])])
            .unwrap();
        registry
            .register_package("pkg2", &["1.0.0"], [("1.0.0", vec![("base", "<=1.5.0")])])
            .unwrap();
        registry
            .register_package("app", &["1.0.0"], [("1.0.0", vec![("pkg1", ""), ("pkg2", "")])])
            .unwrap();

        let set = collect(&registry, "app").unwrap();

        assert_eq!(
            set.packages().collect::<Vec<_>>(),
            vec!["app", "pkg1", "base", "pkg2"]
        );
        assert_eq!(set.root(), Some("app"));
        assert_eq!(rows(&set, "app"), vec!["root *"]);
        assert_eq!(rows(&set, "pkg1"), vec!["app *"]);
        assert_eq!(rows(&set, "base"), vec!["pkg1 >=1.0.0", "pkg2 <=1.5.0"]);
    }

    #[test]
    fn test_re_expands_when_candidate_moves() {
        // `lib` 2.0 needs `extra`; `lib` 1.0 does not. Once `pin` caps `lib`
        // below 2.0 the walk must re-read lib 1.0's dependencies.
        let registry = Registry::new();
        registry
            .register_package(
                "lib",
                &["1.0.0", "2.0.0"],
                [
                    ("2.0.0", vec![("extra", "")]),
                    ("1.0.0", vec![("legacy", "")]),
                ],
            )
            .unwrap();
        registry.register_package("extra", &["1.0"], NO_DEPENDENCIES).unwrap();
        registry.register_package("legacy", &["1.0"], NO_DEPENDENCIES).unwrap();
        registry
            .register_package("pin", &["1.0"], [("1.0", vec![("lib", "<2")])])
            .unwrap();
        registry
            .register_package("app", &["1.0"], [("1.0", vec![("lib", ""), ("pin", "")])])
            .unwrap();

        let set = collect(&registry, "app").unwrap();

        assert!(set.contains("extra"));
        assert!(set.contains("legacy"));
        assert_eq!(rows(&set, "lib"), vec!["app *", "pin <2"]);
    }

    #[test]
    fn test_cycle_terminates() {
        let registry = Registry::new();
        registry
            .register_package(
                "a",
                &["1.0", "2.0"],
                [("1.0", vec![("b", ">=1")]), ("2.0", vec![("b", ">=1")])],
            )
            .unwrap();
        registry
            .register_package("b", &["1.0"], [("1.0", vec![("a", "<=2.0")])])
            .unwrap();

        let set = collect(&registry, "a").unwrap();

        assert_eq!(rows(&set, "a"), vec!["root *", "b <=2.0"]);
        assert_eq!(rows(&set, "b"), vec!["a >=1"]);
    }

    #[test]
    fn test_self_dependency_terminates() {
        let registry = Registry::new();
        registry
            .register_package("ouroboros", &["1.0"], [("1.0", vec![("ouroboros", "==1.0")])])
            .unwrap();

        let set = collect(&registry, "ouroboros").unwrap();
        assert_eq!(rows(&set, "ouroboros"), vec!["root *", "ouroboros ==1.0"]);
    }

    #[test]
    fn test_unknown_dependency_aborts() {
        let registry = Registry::new();
        registry
            .register_package("app", &["1.0"], [("1.0", vec![("ghost", ">=1")])])
            .unwrap();

        let err = collect(&registry, "app").unwrap_err();
        assert!(matches!(err, SproutError::UnknownPackage { ref name } if name == "ghost"));
    }

    #[test]
    fn test_unsatisfiable_rows_stop_expansion() {
        let registry = Registry::new();
        registry
            .register_package("base", &["1.0"], [("1.0", vec![("deep", "")])])
            .unwrap();
        registry.register_package("deep", &["1.0"], NO_DEPENDENCIES).unwrap();

        let snapshot = registry.snapshot();
        let set = Collector::new(&snapshot)
            .collect("base", Some(Constraint::parse(">=2").unwrap()))
            .unwrap();

        assert_eq!(rows(&set, "base"), vec!["root >=2"]);
        assert!(!set.contains("deep"));
    }
}
