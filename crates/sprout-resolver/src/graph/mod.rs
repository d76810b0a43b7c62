//! Dependency graph over a resolved version map, using petgraph
//!
//! Nodes are the selected (name, version) pairs and edges point from a package
//! to each dependency it declares at its selected version. The graph answers
//! the questions install and uninstall need: which packages must be in place
//! first, who depends on whom, and where the cycles are.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use sprout_core::error::SproutError;
use sprout_core::types::{Constraint, ResolvedVersionMap, Version};
use sprout_registry::RegistrySnapshot;
use tracing::trace;

use crate::ResolverResult;

/// Unique identifier for a resolved package
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageId {
    /// Package name
    pub name: String,
    /// Selected version
    pub version: Version,
}

/// Edge from a package to one of its dependencies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Constraint the dependent declared; `None` accepts any version
    pub constraint: Option<Constraint>,
}

/// Directed dependency graph; one node per package name
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    /// Underlying directed graph
    graph: DiGraph<PackageId, DependencyEdge>,
    /// Map from package name to NodeIndex for fast lookups
    node_map: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph of a resolution.
    ///
    /// Nodes are inserted in name order. Edges come from the dependencies each
    /// package declares at its selected version; dependencies outside the map
    /// are skipped.
    pub fn from_resolution(versions: &ResolvedVersionMap, registry: &RegistrySnapshot) -> Self {
        let mut graph = Self::new();
        for (name, version) in versions {
            graph.add_package(PackageId::new(name.clone(), version.clone()));
        }

        for (name, version) in versions {
            for dependency in registry.dependencies_of(name, version) {
                let edge = DependencyEdge::new(dependency.constraint.clone());
                if graph.add_dependency(name, &dependency.name, edge).is_err() {
                    trace!(
                        package = %name,
                        dependency = %dependency.name,
                        "dependency outside resolution"
                    );
                }
            }
        }

        graph
    }

    /// Add a package node; an existing node with the same name is kept
    pub fn add_package(&mut self, package: PackageId) -> NodeIndex {
        if let Some(&existing_index) = self.node_map.get(&package.name) {
            return existing_index;
        }

        let name = package.name.clone();
        let node_index = self.graph.add_node(package);
        self.node_map.insert(name, node_index);
        node_index
    }

    /// Add dependency edge from `from_package` to `to_package`
    pub fn add_dependency(
        &mut self,
        from_package: &str,
        to_package: &str,
        edge: DependencyEdge,
    ) -> ResolverResult<()> {
        let from_index = self.index_of(from_package)?;
        let to_index = self.index_of(to_package)?;
        self.graph.add_edge(from_index, to_index, edge);
        Ok(())
    }

    fn index_of(&self, name: &str) -> ResolverResult<NodeIndex> {
        self.node_map
            .get(name)
            .copied()
            .ok_or_else(|| SproutError::UnknownPackage {
                name: name.to_string(),
            })
    }

    /// Get package node by name
    pub fn get_package(&self, name: &str) -> Option<&PackageId> {
        let node_index = self.node_map.get(name)?;
        self.graph.node_weight(*node_index)
    }

    /// Get all packages in the graph
    pub fn packages(&self) -> impl Iterator<Item = &PackageId> {
        self.graph.node_weights()
    }

    /// Packages `name` depends on, sorted by name
    pub fn dependencies(&self, name: &str) -> Vec<&PackageId> {
        self.neighbors(name, Direction::Outgoing)
    }

    /// Packages that depend on `name`, sorted by name
    pub fn dependents(&self, name: &str) -> Vec<&PackageId> {
        self.neighbors(name, Direction::Incoming)
    }

    fn neighbors(&self, name: &str, direction: Direction) -> Vec<&PackageId> {
        let Some(&index) = self.node_map.get(name) else {
            return Vec::new();
        };

        let mut neighbors: Vec<&PackageId> = self
            .graph
            .neighbors_directed(index, direction)
            .filter(|&neighbor| neighbor != index)
            .map(|neighbor| &self.graph[neighbor])
            .collect();
        neighbors.sort_by(|a, b| a.name.cmp(&b.name));
        neighbors.dedup_by(|a, b| a.name == b.name);
        neighbors
    }

    /// Order in which packages can be installed, dependencies first.
    ///
    /// Packages on a cycle are installed together, in name order. Among
    /// packages whose dependencies are all in place, the alphabetically first
    /// goes next, so the order is deterministic.
    pub fn install_order(&self) -> Vec<PackageId> {
        let components = self.components();

        let mut component_of = vec![0; self.graph.node_count()];
        for (component, members) in components.iter().enumerate() {
            for member in members {
                if let Some(&index) = self.node_map.get(&member.name) {
                    component_of[index.index()] = component;
                }
            }
        }

        // waiting[c]: components c still needs; unblocks[c]: components waiting on c
        let mut waiting = vec![BTreeSet::new(); components.len()];
        let mut unblocks = vec![BTreeSet::new(); components.len()];
        for edge in self.graph.edge_references() {
            let from = component_of[edge.source().index()];
            let to = component_of[edge.target().index()];
            if from != to {
                waiting[from].insert(to);
                unblocks[to].insert(from);
            }
        }

        let mut ready: BTreeSet<(&str, usize)> = waiting
            .iter()
            .enumerate()
            .filter(|(_, needs)| needs.is_empty())
            .map(|(component, _)| (components[component][0].name.as_str(), component))
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some((_, component)) = ready.pop_first() {
            order.extend(components[component].iter().map(|&id| id.clone()));

            for &dependent in &unblocks[component] {
                waiting[dependent].remove(&component);
                if waiting[dependent].is_empty() {
                    ready.insert((components[dependent][0].name.as_str(), dependent));
                }
            }
        }

        order
    }

    /// Every dependency cycle, each listed in name order
    pub fn cycles(&self) -> Vec<Vec<PackageId>> {
        self.components()
            .into_iter()
            .filter(|members| {
                members.len() > 1
                    || self
                        .node_map
                        .get(&members[0].name)
                        .is_some_and(|&index| self.graph.contains_edge(index, index))
            })
            .map(|members| members.into_iter().cloned().collect())
            .collect()
    }

    /// Check if any package transitively depends on itself
    pub fn has_cycles(&self) -> bool {
        !self.cycles().is_empty()
    }

    /// Strongly connected components with members sorted by name
    fn components(&self) -> Vec<Vec<&PackageId>> {
        let mut components: Vec<Vec<&PackageId>> = tarjan_scc(&self.graph)
            .into_iter()
            .map(|indices| {
                let mut members: Vec<&PackageId> =
                    indices.into_iter().map(|index| &self.graph[index]).collect();
                members.sort_by(|a, b| a.name.cmp(&b.name));
                members
            })
            .collect();
        components.sort_by(|a, b| a[0].name.cmp(&b[0].name));
        components
    }

    /// Format cycle as "a -> b -> c -> a"
    pub fn format_cycle(cycle: &[PackageId]) -> String {
        let mut names: Vec<&str> = cycle.iter().map(|id| id.name.as_str()).collect();
        if let Some(&first) = names.first() {
            names.push(first);
        }
        names.join(" -> ")
    }

    /// Get number of packages in the graph
    pub fn package_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get number of dependencies in the graph
    pub fn dependency_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl PackageId {
    /// Create a new package ID
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=={}", self.name, self.version)
    }
}

impl DependencyEdge {
    /// Create a new dependency edge
    pub fn new(constraint: Option<Constraint>) -> Self {
        Self { constraint }
    }

    /// Edge that accepts any version
    pub fn any() -> Self {
        Self::new(None)
    }
}
