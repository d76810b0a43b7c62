//! sprout.toml configuration parsing and serialization

use std::collections::{BTreeMap, HashMap};

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use sprout_core::error::SproutError;
use sprout_core::types::{is_valid_package_name, Constraint, Dependency, PackageSpec, Version};
use sprout_registry::Registry;
use tracing::debug;

use crate::ConfigResult;

/// Name of the project configuration file
pub const CONFIG_FILE_NAME: &str = "sprout.toml";

/// Default lockfile path, relative to the configuration file
pub const DEFAULT_LOCKFILE: &str = "sprout.lock";

/// Default log filter
pub const DEFAULT_LOG: &str = "info";

/// Complete sprout.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SproutToml {
    /// Settings section
    #[serde(default)]
    pub settings: Settings,

    /// Package catalog, keyed by package name
    #[serde(default)]
    pub packages: BTreeMap<String, PackageEntry>,
}

/// `[settings]` section; unset fields fall back to the defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Lockfile path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lockfile: Option<Utf8PathBuf>,

    /// Log filter (e.g. `debug` or `sprout_resolver=trace`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
}

/// One package of the catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageEntry {
    /// Published versions
    pub versions: Vec<String>,

    /// Dependencies per published version
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, Vec<DependencyEntry>>,
}

/// Dependency entry (bare name or name with constraint)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencyEntry {
    /// Any version of the named package
    Name(String),

    /// Named package restricted by a constraint
    Detailed {
        /// Package name
        name: String,

        /// Constraint text; absent, empty or `*` accepts any version
        #[serde(default, skip_serializing_if = "Option::is_none")]
        constraint: Option<String>,
    },
}

impl Settings {
    /// Lockfile path, or `sprout.lock`
    pub fn lockfile(&self) -> Utf8PathBuf {
        self.lockfile
            .clone()
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_LOCKFILE))
    }

    /// Log filter, or `info`
    pub fn log(&self) -> &str {
        self.log.as_deref().unwrap_or(DEFAULT_LOG)
    }
}

impl DependencyEntry {
    /// Dependency package name
    pub fn name(&self) -> &str {
        match self {
            DependencyEntry::Name(name) => name,
            DependencyEntry::Detailed { name, .. } => name,
        }
    }

    /// Constraint text; empty when unconstrained
    pub fn constraint_text(&self) -> &str {
        match self {
            DependencyEntry::Name(_) => "",
            DependencyEntry::Detailed { constraint, .. } => constraint.as_deref().unwrap_or(""),
        }
    }

    /// Parse into a dependency
    pub fn to_dependency(&self) -> ConfigResult<Dependency> {
        let constraint = Constraint::parse_optional(self.constraint_text())?;
        Ok(Dependency::new(self.name(), constraint))
    }
}

impl PackageEntry {
    /// Parse into a package spec named `name`
    pub fn to_spec(&self, name: &str) -> ConfigResult<PackageSpec> {
        let versions = self
            .versions
            .iter()
            .map(|text| Version::parse(text))
            .collect::<ConfigResult<Vec<_>>>()?;

        let mut dependencies: HashMap<Version, Vec<Dependency>> = HashMap::new();
        for (version, entries) in &self.dependencies {
            let version = Version::parse(version)?;
            let parsed = entries
                .iter()
                .map(DependencyEntry::to_dependency)
                .collect::<ConfigResult<Vec<_>>>()?;
            dependencies.entry(version).or_default().extend(parsed);
        }

        Ok(PackageSpec::new(name, versions, dependencies))
    }
}

impl SproutToml {
    /// Parse every catalog entry
    pub fn package_specs(&self) -> ConfigResult<Vec<PackageSpec>> {
        self.packages
            .iter()
            .map(|(name, entry)| entry.to_spec(name))
            .collect()
    }

    /// Register the whole catalog into `registry`.
    ///
    /// Every entry is parsed before the first one is registered, so a bad
    /// entry leaves the registry untouched. Returns the number registered.
    pub fn populate(&self, registry: &Registry) -> ConfigResult<usize> {
        let specs = self.package_specs()?;
        let count = specs.len();
        for spec in &specs {
            spec.validate_names()?;
        }
        for spec in specs {
            registry.register(spec)?;
        }
        debug!(packages = count, "populated registry from configuration");
        Ok(count)
    }

    /// Check the catalog for entries the resolver could not use
    pub fn validate(&self) -> ConfigResult<()> {
        validate_config(self)
    }
}

/// Parse TOML string to SproutToml configuration
pub fn parse_sprout_toml(content: &str) -> ConfigResult<SproutToml> {
    let config: SproutToml = toml::from_str(content).map_err(|e| SproutError::ConfigParse {
        message: e.to_string(),
    })?;

    validate_config(&config)?;

    Ok(config)
}

/// Serialize SproutToml to TOML string
pub fn serialize_sprout_toml(config: &SproutToml) -> ConfigResult<String> {
    toml::to_string_pretty(config).map_err(|e| SproutError::ConfigParse {
        message: format!("TOML serialization error: {e}"),
    })
}

/// Validate configuration completeness
pub fn validate_config(config: &SproutToml) -> ConfigResult<()> {
    if let Some(log) = &config.settings.log {
        if log.trim().is_empty() {
            return Err(SproutError::ConfigValidation {
                field: "settings.log".to_string(),
                reason: "log filter must not be empty".to_string(),
            });
        }
    }

    for (name, entry) in &config.packages {
        validate_package(name, entry)?;
    }

    Ok(())
}

fn validate_package(name: &str, entry: &PackageEntry) -> ConfigResult<()> {
    if !is_valid_package_name(name) {
        return Err(SproutError::ConfigValidation {
            field: format!("packages.{name}"),
            reason: "package names may only contain letters, digits, '-', '_' and '.'".to_string(),
        });
    }

    if entry.versions.is_empty() {
        return Err(SproutError::ConfigValidation {
            field: format!("packages.{name}.versions"),
            reason: "at least one version must be published".to_string(),
        });
    }

    let spec = entry.to_spec(name)?;
    if let Some(version) = spec.unpublished_dependency_keys().first() {
        return Err(SproutError::ConfigValidation {
            field: format!("packages.{name}.dependencies"),
            reason: format!("dependencies declared for unpublished version {version}"),
        });
    }

    for dependency in entry.dependencies.values().flatten() {
        if !is_valid_package_name(dependency.name()) {
            return Err(SproutError::ConfigValidation {
                field: format!("packages.{name}.dependencies"),
                reason: format!("invalid dependency name '{}'", dependency.name()),
            });
        }
    }

    Ok(())
}

/// Load and parse sprout.toml from file path
pub fn load_from_file(path: &Utf8Path) -> ConfigResult<SproutToml> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| SproutError::io(format!("Failed to read {path}"), e))?;

    parse_sprout_toml(&content).map_err(|e| match e {
        SproutError::ConfigParse { message } => SproutError::ConfigParse {
            message: format!("In file {path}: {message}"),
        },
        other => other,
    })
}
