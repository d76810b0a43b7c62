//! Version selection against accumulated requirement rows
//!
//! Given a package's published versions and every (requirer, constraint) row
//! collected for it, pick the highest version that satisfies all of them.

use sprout_core::types::{Constraint, Requirement, Version};

/// Version selector over one package's published versions
#[derive(Debug, Clone, Copy)]
pub struct VersionSelector<'a> {
    /// Available versions sorted in ascending order
    available_versions: &'a [Version],
}

impl<'a> VersionSelector<'a> {
    /// Create a selector over versions sorted ascending
    pub fn new(available_versions: &'a [Version]) -> Self {
        Self { available_versions }
    }

    /// Select the highest version accepted by every requirement row
    pub fn select_best(&self, requirements: &[Requirement]) -> Option<&'a Version> {
        self.available_versions
            .iter()
            .rev() // Start with highest versions
            .find(|version| requirements.iter().all(|row| row.accepts(version)))
    }

    /// Find all versions matching one constraint, ascending
    pub fn find_matching(&self, constraint: &Constraint) -> Vec<&'a Version> {
        self.available_versions
            .iter()
            .filter(|version| constraint.matches(version))
            .collect()
    }

    /// Get the highest available version
    pub fn highest_version(&self) -> Option<&'a Version> {
        self.available_versions.last()
    }

    /// Check if any version is accepted by every requirement row
    pub fn has_matching(&self, requirements: &[Requirement]) -> bool {
        self.select_best(requirements).is_some()
    }
}
