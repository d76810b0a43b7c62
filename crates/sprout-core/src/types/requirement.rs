//! Resolution bookkeeping types.
//!
//! Requirement rows are accumulated per package while walking the dependency
//! graph; conflicts report the rows that no published version satisfies; the
//! resolved map is the final one-version-per-package answer.

use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use super::{Constraint, Version};

/// Requirer name attributed to the root request
pub const ROOT_REQUIRER: &str = "root";

/// One (requirer, constraint) row imposed on a package
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Requirement {
    pub requirer: String,
    /// `None` marks the package as required without restricting its version
    pub constraint: Option<Constraint>,
}

/// A package whose accumulated requirements no published version satisfies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub package: String,
    pub requirers: Vec<Requirement>,
    /// Rows from `requirers` that the requirer's selected version no longer declares
    pub superseded: Vec<Requirement>,
}

/// Exactly one selected version per package name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedVersionMap(BTreeMap<String, Version>);

impl Requirement {
    /// Create a new requirement row
    pub fn new(requirer: impl Into<String>, constraint: Option<Constraint>) -> Self {
        Self {
            requirer: requirer.into(),
            constraint,
        }
    }

    /// Check whether `version` satisfies this row
    pub fn accepts(&self, version: &Version) -> bool {
        self.constraint
            .as_ref()
            .map_or(true, |constraint| constraint.matches(version))
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            Some(constraint) => write!(f, "{} {}", self.requirer, constraint),
            None => write!(f, "{} *", self.requirer),
        }
    }
}

impl Conflict {
    /// Create a new conflict entry
    pub fn new(package: String, requirers: Vec<Requirement>) -> Self {
        Self {
            package,
            requirers,
            superseded: Vec::new(),
        }
    }

    /// Mark rows that were declared by a replaced version of their requirer
    pub fn with_superseded(mut self, superseded: Vec<Requirement>) -> Self {
        self.superseded = superseded;
        self
    }

    /// Check if `row` came from a replaced version of its requirer
    pub fn is_superseded(&self, row: &Requirement) -> bool {
        self.superseded.contains(row)
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<String> = self
            .requirers
            .iter()
            .map(|row| {
                if self.is_superseded(row) {
                    format!("{row} [superseded]")
                } else {
                    row.to_string()
                }
            })
            .collect();
        write!(f, "{} ({})", self.package, rows.join(", "))
    }
}

impl ResolvedVersionMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert a selection, returning the previous version for that name
    pub fn insert(&mut self, name: impl Into<String>, version: Version) -> Option<Version> {
        self.0.insert(name.into(), version)
    }

    /// Selected version for `name`
    pub fn get(&self, name: &str) -> Option<&Version> {
        self.0.get(name)
    }

    /// Check if `name` has a selection
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of packages
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the map is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in ascending name order
    pub fn iter(&self) -> btree_map::Iter<'_, String, Version> {
        self.0.iter()
    }

    /// Package names in ascending order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl FromIterator<(String, Version)> for ResolvedVersionMap {
    fn from_iter<I: IntoIterator<Item = (String, Version)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ResolvedVersionMap {
    type Item = (String, Version);
    type IntoIter = btree_map::IntoIter<String, Version>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResolvedVersionMap {
    type Item = (&'a String, &'a Version);
    type IntoIter = btree_map::Iter<'a, String, Version>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
