//! Package manager facade
//!
//! Ties the registry, resolver, ledger and lockfile codec together behind the
//! string-based interface external callers use, plus typed equivalents for
//! Rust callers.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use sprout_config::{ConfigLayering, ConfigLoader, SproutToml};
use sprout_core::error::SproutResult;
use sprout_core::types::{validate_package_name, Constraint, ResolvedVersionMap, Version};
use sprout_ledger::{InstallLedger, UpdateSuggestion};
use sprout_lockfile::{decode, encode, read_lockfile, write_lockfile, DEFAULT_LOCKFILE_NAME};
use sprout_registry::Registry;
use sprout_resolver::{DependencyGraph, Resolver};
use tracing::{debug, info};

use crate::outcome::{ResolveOutcome, Status, UninstallOutcome};

/// Registry, resolver and install ledger behind one interface
#[derive(Debug)]
pub struct PackageManager {
    registry: Arc<Registry>,
    resolver: Resolver,
    ledger: InstallLedger,
    lockfile_path: Utf8PathBuf,
}

impl PackageManager {
    /// Create a manager over `registry` with an empty ledger
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            resolver: Resolver::new(Arc::clone(&registry)),
            ledger: InstallLedger::new(Arc::clone(&registry)),
            registry,
            lockfile_path: Utf8PathBuf::from(DEFAULT_LOCKFILE_NAME),
        }
    }

    /// Create a manager whose registry holds the configured catalog
    pub fn from_config(config: &SproutToml) -> SproutResult<Self> {
        let registry = Arc::new(Registry::new());
        config.populate(&registry)?;
        Ok(Self::new(registry).with_lockfile_path(config.settings.lockfile()))
    }

    /// Create a manager from the configuration layered for `cwd`.
    ///
    /// Reads `~/.sprout/config.toml`, the nearest `sprout.toml` at or above
    /// `cwd` and the `SPROUT_*` environment variables.
    pub fn from_directory(cwd: impl Into<Utf8PathBuf>) -> SproutResult<Self> {
        Self::load(&ConfigLoader::new(cwd.into()), HashMap::new())
    }

    /// Create a manager from `loader`'s files, the `SPROUT_*` environment and
    /// caller `overrides` (`lockfile`, `log`), highest priority last
    pub fn load(loader: &ConfigLoader, overrides: HashMap<String, String>) -> SproutResult<Self> {
        let loaded = loader.load(ConfigLayering::collect_env_overrides(), overrides)?;
        for source in &loaded.sources {
            debug!(?source, "applied configuration layer");
        }
        Self::from_config(&loaded.config)
    }

    /// Use `path` for `save_lockfile` and `install_lockfile_file`
    pub fn with_lockfile_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.lockfile_path = path.into();
        self
    }

    /// Shared registry
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Resolver over the shared registry
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Install ledger
    pub fn ledger(&self) -> &InstallLedger {
        &self.ledger
    }

    /// Configured lockfile path
    pub fn lockfile_path(&self) -> &Utf8Path {
        &self.lockfile_path
    }

    /// Register a package from its textual form; see [`Registry::register_package`]
    pub fn register_package<V, K, D, N, C>(
        &self,
        name: &str,
        versions: &[V],
        dependencies: impl IntoIterator<Item = (K, D)>,
    ) -> SproutResult<()>
    where
        V: AsRef<str>,
        K: AsRef<str>,
        D: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: AsRef<str>,
    {
        self.registry.register_package(name, versions, dependencies)
    }

    /// Resolve `root`, reporting the result in serializable form
    pub fn resolve(&self, root: &str, constraint: Option<&str>) -> ResolveOutcome {
        match self.resolver.resolve_str(root, constraint) {
            Ok(versions) => ResolveOutcome::from(versions),
            Err(error) => ResolveOutcome::from(error),
        }
    }

    /// Resolve `root` with a typed constraint
    pub fn resolve_versions(
        &self,
        root: &str,
        constraint: Option<Constraint>,
    ) -> SproutResult<ResolvedVersionMap> {
        self.resolver.resolve(root, constraint)
    }

    /// Resolve `root` and install the result; returns `name==version` in install order
    pub fn install_package(
        &self,
        root: &str,
        constraint: Option<&str>,
    ) -> SproutResult<Vec<String>> {
        let versions = self.resolver.resolve_str(root, constraint)?;
        Ok(self.install_resolved(&versions))
    }

    /// Install a name to version-string map without resolving
    pub fn install(&self, versions: &BTreeMap<String, String>) -> SproutResult<Vec<String>> {
        let versions = parse_version_map(versions)?;
        Ok(self.install_resolved(&versions))
    }

    /// Install a resolved map; returns `name==version` with dependencies first
    pub fn install_resolved(&self, versions: &ResolvedVersionMap) -> Vec<String> {
        let graph = DependencyGraph::from_resolution(versions, &self.registry.snapshot());
        for cycle in graph.cycles() {
            debug!(
                cycle = %DependencyGraph::format_cycle(&cycle),
                "installing dependency cycle together"
            );
        }

        let order: Vec<String> = graph.install_order().iter().map(ToString::to_string).collect();
        self.ledger.install(versions);

        info!(packages = order.len(), "installed packages");
        order
    }

    /// Uninstall `name`, reporting the result in serializable form
    pub fn uninstall(&self, name: &str) -> UninstallOutcome {
        match self.ledger.uninstall(name) {
            Ok(_) => UninstallOutcome::Ok(Status::Ok),
            Err(error) => UninstallOutcome::from(error),
        }
    }

    /// Encode a name to version-string map as lockfile text
    pub fn to_lockfile(&self, versions: &BTreeMap<String, String>) -> SproutResult<String> {
        encode(&parse_version_map(versions)?)
    }

    /// Decode lockfile text into a name to version-string map
    pub fn from_lockfile(&self, text: &str) -> SproutResult<BTreeMap<String, String>> {
        Ok(decode(text)?
            .into_iter()
            .map(|(name, version)| (name, version.to_string()))
            .collect())
    }

    /// Install exactly what a lockfile records, without resolving
    pub fn install_lockfile(&self, text: &str) -> SproutResult<Vec<String>> {
        let versions = decode(text)?;
        Ok(self.install_resolved(&versions))
    }

    /// Lockfile text for the currently installed packages
    pub fn lockfile(&self) -> SproutResult<String> {
        encode(&self.ledger.snapshot())
    }

    /// Write the installed state to the configured lockfile path
    pub fn save_lockfile(&self) -> SproutResult<()> {
        write_lockfile(&self.lockfile_path, &self.ledger.snapshot())
    }

    /// Install what the lockfile at the configured path records
    pub fn install_lockfile_file(&self) -> SproutResult<Vec<String>> {
        let versions = read_lockfile(&self.lockfile_path)?;
        Ok(self.install_resolved(&versions))
    }

    /// Installed packages with a newer published version
    pub fn outdated(&self) -> Vec<UpdateSuggestion> {
        self.ledger.outdated()
    }
}

fn parse_version_map(versions: &BTreeMap<String, String>) -> SproutResult<ResolvedVersionMap> {
    versions
        .iter()
        .map(|(name, version)| -> SproutResult<(String, Version)> {
            validate_package_name(name)?;
            Ok((name.clone(), Version::parse(version)?))
        })
        .collect()
}
