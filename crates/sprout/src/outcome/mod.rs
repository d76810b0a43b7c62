//! Serializable results of the string interface
//!
//! These mirror the shapes callers outside Rust exchange:
//! `{"ok": {...}}`, `{"conflicts": [...]}`, `{"error": "unknown-package"}` for
//! resolution, and `"ok"` or `{"error": "has-dependents", "blockers": [...]}`
//! for uninstall.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sprout_core::error::SproutError;
use sprout_core::types::{Conflict, Requirement, ResolvedVersionMap};

/// Outcome of a resolution request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveOutcome {
    /// Selected version per package
    Ok(BTreeMap<String, String>),
    /// Every package no version could satisfy
    Conflicts(Vec<ConflictReport>),
    /// Any other failure, by error code
    Error(String),
}

/// One unsatisfiable package and its (requirer, constraint) rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub package: String,
    /// `*` stands for "any version"
    pub requirers: Vec<(String, String)>,
    /// Rows declared by a version of the requirer that was not selected
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub superseded: Vec<(String, String)>,
}

/// Outcome of an uninstall request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UninstallOutcome {
    /// Package removed
    Ok(Status),
    /// Package kept
    Failed {
        error: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        blockers: Vec<String>,
    },
}

/// Success marker, serialized as `"ok"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
}

impl ResolveOutcome {
    /// Check if resolution succeeded
    pub fn is_ok(&self) -> bool {
        matches!(self, ResolveOutcome::Ok(_))
    }
}

impl From<ResolvedVersionMap> for ResolveOutcome {
    fn from(versions: ResolvedVersionMap) -> Self {
        ResolveOutcome::Ok(
            versions
                .into_iter()
                .map(|(name, version)| (name, version.to_string()))
                .collect(),
        )
    }
}

impl From<SproutError> for ResolveOutcome {
    fn from(error: SproutError) -> Self {
        match error {
            SproutError::ResolutionConflict { conflicts } => {
                ResolveOutcome::Conflicts(conflicts.iter().map(ConflictReport::from).collect())
            },
            other => ResolveOutcome::Error(other.kind().to_string()),
        }
    }
}

impl From<&Conflict> for ConflictReport {
    fn from(conflict: &Conflict) -> Self {
        Self {
            package: conflict.package.clone(),
            requirers: conflict.requirers.iter().map(report_row).collect(),
            superseded: conflict.superseded.iter().map(report_row).collect(),
        }
    }
}

fn report_row(row: &Requirement) -> (String, String) {
    let constraint = row
        .constraint
        .as_ref()
        .map_or_else(|| "*".to_string(), ToString::to_string);
    (row.requirer.clone(), constraint)
}

impl UninstallOutcome {
    /// Check if the package was removed
    pub fn is_ok(&self) -> bool {
        matches!(self, UninstallOutcome::Ok(_))
    }
}

impl From<SproutError> for UninstallOutcome {
    fn from(error: SproutError) -> Self {
        let error_code = error.kind().to_string();
        match error {
            SproutError::HasDependents { blockers, .. } => UninstallOutcome::Failed {
                error: error_code,
                blockers,
            },
            _ => UninstallOutcome::Failed {
                error: error_code,
                blockers: Vec::new(),
            },
        }
    }
}
