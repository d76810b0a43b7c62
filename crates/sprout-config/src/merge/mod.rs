//! Configuration discovery, layering and environment overrides

use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use sprout_core::error::SproutError;
use tracing::debug;

use crate::toml::{load_from_file, SproutToml, CONFIG_FILE_NAME};
use crate::ConfigResult;

/// Environment variable overriding `settings.lockfile`
pub const ENV_LOCKFILE: &str = "SPROUT_LOCKFILE";

/// Environment variable overriding `settings.log`
pub const ENV_LOG: &str = "SPROUT_LOG";

/// Caller override key for `settings.lockfile`
pub const OVERRIDE_LOCKFILE: &str = "lockfile";

/// Caller override key for `settings.log`
pub const OVERRIDE_LOG: &str = "log";

/// Main configuration loading interface
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Current working directory
    cwd: Utf8PathBuf,
    /// Global config file; `~/.sprout/config.toml` when unset
    global_path: Option<Utf8PathBuf>,
}

/// Merged configuration and the layers that contributed to it
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: SproutToml,
    /// Lowest priority first
    pub sources: Vec<ConfigSource>,
}

/// Configuration layering: global file, project file, environment, caller
#[derive(Debug, Clone, Default)]
pub struct ConfigLayering {
    /// Global configuration
    global_config: Option<SproutToml>,
    /// Project configuration
    project_config: Option<SproutToml>,
    /// Environment overrides
    env_overrides: HashMap<String, String>,
    /// Caller overrides (`lockfile`, `log`)
    cli_overrides: HashMap<String, String>,
}

/// Configuration source tracking
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Global config file
    Global(Utf8PathBuf),
    /// Project sprout.toml file
    Project(Utf8PathBuf),
    /// Environment variable
    Environment(String),
    /// Explicit caller override
    CommandLine,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new(cwd: Utf8PathBuf) -> Self {
        Self {
            cwd,
            global_path: None,
        }
    }

    /// Read the global layer from `path` instead of the home directory
    pub fn with_global_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.global_path = Some(path.into());
        self
    }

    /// Load the global and project files and layer the overrides on top.
    ///
    /// A project `sprout.toml` is required; the global file is optional.
    pub fn load(
        &self,
        env_overrides: HashMap<String, String>,
        cli_overrides: HashMap<String, String>,
    ) -> ConfigResult<LoadedConfig> {
        let mut sources = Vec::new();

        let global = self.load_global_config()?.map(|(config, source)| {
            sources.push(source);
            config
        });

        let (project, source) = self.load_project_config()?;
        sources.push(source);

        let mut env_keys: Vec<&String> = env_overrides
            .keys()
            .filter(|key| matches!(key.as_str(), ENV_LOCKFILE | ENV_LOG))
            .collect();
        env_keys.sort();
        sources.extend(env_keys.into_iter().map(|key| ConfigSource::Environment(key.clone())));

        if cli_overrides
            .keys()
            .any(|key| matches!(key.as_str(), OVERRIDE_LOCKFILE | OVERRIDE_LOG))
        {
            sources.push(ConfigSource::CommandLine);
        }

        let config = ConfigLayering::new()
            .with_global(global)
            .with_project(project)
            .with_env_overrides(env_overrides)
            .with_cli_overrides(cli_overrides)
            .build()?;

        Ok(LoadedConfig { config, sources })
    }

    /// Load the nearest sprout.toml at or above the working directory
    pub fn load_project_config(&self) -> ConfigResult<(SproutToml, ConfigSource)> {
        let path = self.resolve_config_path(CONFIG_FILE_NAME)?;
        if !path.exists() {
            return Err(SproutError::ConfigValidation {
                field: "config".to_string(),
                reason: format!(
                    "No {CONFIG_FILE_NAME} found in {} or parent directories",
                    self.cwd
                ),
            });
        }

        debug!(path = %path, "loading project configuration");
        let config = load_from_file(&path)?;
        Ok((config, ConfigSource::Project(path)))
    }

    /// Find configuration file in project (walks up directory tree)
    pub fn resolve_config_path(&self, filename: &str) -> ConfigResult<Utf8PathBuf> {
        let mut current: Option<&Utf8Path> = Some(self.cwd.as_path());

        while let Some(dir) = current {
            let config_path = dir.join(filename);
            if config_path.exists() {
                return Ok(config_path);
            }
            current = dir.parent();
        }

        // Path in the working directory, even though it does not exist
        Ok(self.cwd.join(filename))
    }

    /// Path of the global configuration file (`~/.sprout/config.toml`)
    pub fn global_config_path() -> ConfigResult<Utf8PathBuf> {
        let home_dir = dirs::home_dir().ok_or_else(|| SproutError::ConfigValidation {
            field: "home_dir".to_string(),
            reason: "Could not determine home directory".to_string(),
        })?;

        let home_dir = Utf8PathBuf::try_from(home_dir).map_err(|e| SproutError::ConfigValidation {
            field: "home_dir".to_string(),
            reason: format!("Invalid home directory path: {e}"),
        })?;

        Ok(home_dir.join(".sprout").join("config.toml"))
    }

    /// Load global configuration, if one exists
    pub fn load_global_config(&self) -> ConfigResult<Option<(SproutToml, ConfigSource)>> {
        let path = match &self.global_path {
            Some(path) => path.clone(),
            None => Self::global_config_path()?,
        };
        if !path.exists() {
            return Ok(None);
        }

        debug!(path = %path, "loading global configuration");
        let config = load_from_file(&path)?;
        Ok(Some((config, ConfigSource::Global(path))))
    }

    /// Working directory the loader searches from
    pub fn cwd(&self) -> &Utf8Path {
        &self.cwd
    }
}

impl ConfigLayering {
    /// Create a new configuration layering system
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the global layer
    pub fn with_global(mut self, config: Option<SproutToml>) -> Self {
        self.global_config = config;
        self
    }

    /// Set the project layer
    pub fn with_project(mut self, config: SproutToml) -> Self {
        self.project_config = Some(config);
        self
    }

    /// Set the environment overrides
    pub fn with_env_overrides(mut self, overrides: HashMap<String, String>) -> Self {
        self.env_overrides = overrides;
        self
    }

    /// Set the caller overrides
    pub fn with_cli_overrides(mut self, overrides: HashMap<String, String>) -> Self {
        self.cli_overrides = overrides;
        self
    }

    /// Merge every layer that was set
    pub fn build(self) -> ConfigResult<SproutToml> {
        Self::merge_configs(
            self.global_config,
            self.project_config.unwrap_or_default(),
            self.env_overrides,
            self.cli_overrides,
        )
    }

    /// Merge multiple configuration layers
    pub fn merge_configs(
        global_config: Option<SproutToml>,
        project_config: SproutToml,
        env_overrides: HashMap<String, String>,
        cli_overrides: HashMap<String, String>,
    ) -> ConfigResult<SproutToml> {
        let mut merged = project_config;

        // Global values only fill what the project leaves unset
        if let Some(global) = global_config {
            for (name, entry) in global.packages {
                merged.packages.entry(name).or_insert(entry);
            }
            merged.settings.lockfile = merged.settings.lockfile.or(global.settings.lockfile);
            merged.settings.log = merged.settings.log.or(global.settings.log);
        }

        Self::apply_env_overrides(&mut merged, &env_overrides)?;

        // Caller overrides have the highest priority
        Self::apply_cli_overrides(&mut merged, &cli_overrides)?;

        Ok(merged)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(
        config: &mut SproutToml,
        overrides: &HashMap<String, String>,
    ) -> ConfigResult<()> {
        for (key, value) in overrides {
            match key.as_str() {
                ENV_LOCKFILE => config.settings.lockfile = Some(non_empty(key, value)?.into()),
                ENV_LOG => config.settings.log = Some(non_empty(key, value)?.to_string()),
                _ => {
                    // Unknown environment variable, ignore
                },
            }
        }

        Ok(())
    }

    /// Apply caller overrides
    fn apply_cli_overrides(
        config: &mut SproutToml,
        overrides: &HashMap<String, String>,
    ) -> ConfigResult<()> {
        for (key, value) in overrides {
            match key.as_str() {
                OVERRIDE_LOCKFILE => {
                    config.settings.lockfile = Some(non_empty(key, value)?.into());
                },
                OVERRIDE_LOG => config.settings.log = Some(non_empty(key, value)?.to_string()),
                _ => {
                    // Unknown override, ignore
                },
            }
        }

        Ok(())
    }

    /// Collect environment variable overrides
    pub fn collect_env_overrides() -> HashMap<String, String> {
        std::env::vars()
            .filter(|(key, _)| key.starts_with("SPROUT_"))
            .collect()
    }
}

fn non_empty<'a>(field: &str, value: &'a str) -> ConfigResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(SproutError::ConfigValidation {
            field: field.to_string(),
            reason: "override must not be empty".to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toml::{PackageEntry, Settings};
    use tempfile::TempDir;

    fn create_test_config() -> SproutToml {
        let mut config = SproutToml {
            settings: Settings {
                lockfile: Some("project.lock".into()),
                log: None,
            },
            ..SproutToml::default()
        };
        config.packages.insert(
            "base".to_string(),
            PackageEntry {
                versions: vec!["1.0".to_string()],
                ..PackageEntry::default()
            },
        );
        config
    }

    fn utf8_dir(temp_dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_resolve_config_path_walks_up() {
        let temp_dir = TempDir::new().unwrap();
        let root = utf8_dir(&temp_dir);
        std::fs::write(root.join(CONFIG_FILE_NAME), "").unwrap();
        let nested = root.join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let loader = ConfigLoader::new(nested.clone());

        assert_eq!(
            loader.resolve_config_path(CONFIG_FILE_NAME).unwrap(),
            root.join(CONFIG_FILE_NAME)
        );
        assert_eq!(
            loader.resolve_config_path("missing.toml").unwrap(),
            nested.join("missing.toml")
        );
    }

    #[test]
    fn test_load_project_config() {
        let temp_dir = TempDir::new().unwrap();
        let root = utf8_dir(&temp_dir);
        std::fs::write(
            root.join(CONFIG_FILE_NAME),
            "[packages.base]\nversions = [\"1.0\", \"2.0\"]\n",
        )
        .unwrap();

        let (config, source) = ConfigLoader::new(root.clone()).load_project_config().unwrap();

        assert_eq!(config.packages["base"].versions.len(), 2);
        assert_eq!(source, ConfigSource::Project(root.join(CONFIG_FILE_NAME)));
    }

    #[test]
    fn test_load_project_config_missing() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::new(utf8_dir(&temp_dir));

        let err = loader.load_project_config().unwrap_err();
        assert_eq!(err.kind(), "config-validation");
    }

    #[test]
    fn test_load_global_config() {
        let temp_dir = TempDir::new().unwrap();
        let root = utf8_dir(&temp_dir);
        let global_path = root.join("global.toml");

        let loader = ConfigLoader::new(root.clone()).with_global_path(&global_path);
        assert!(loader.load_global_config().unwrap().is_none());

        std::fs::write(&global_path, "[settings]\nlog = \"warn\"\n").unwrap();
        let (config, source) = loader.load_global_config().unwrap().unwrap();

        assert_eq!(config.settings.log(), "warn");
        assert_eq!(source, ConfigSource::Global(global_path));
    }

    #[test]
    fn test_load_layers_and_sources() {
        let temp_dir = TempDir::new().unwrap();
        let root = utf8_dir(&temp_dir);
        let global_path = root.join("global.toml");
        std::fs::write(
            &global_path,
            r#"
[settings]
log = "warn"
lockfile = "global.lock"

[packages.shared]
versions = ["1.0"]
"#,
        )
        .unwrap();
        std::fs::write(root.join(CONFIG_FILE_NAME), "[packages.app]\nversions = [\"1.0\"]\n")
            .unwrap();

        let env = HashMap::from([
            (ENV_LOG.to_string(), "debug".to_string()),
            ("SPROUT_UNRELATED".to_string(), "x".to_string()),
        ]);
        let cli = HashMap::from([(OVERRIDE_LOCKFILE.to_string(), "cli.lock".to_string())]);

        let loaded = ConfigLoader::new(root.clone())
            .with_global_path(&global_path)
            .load(env, cli)
            .unwrap();

        assert_eq!(loaded.config.settings.log(), "debug");
        assert_eq!(loaded.config.settings.lockfile(), Utf8PathBuf::from("cli.lock"));
        assert_eq!(
            loaded.config.packages.keys().collect::<Vec<_>>(),
            vec!["app", "shared"]
        );
        assert_eq!(
            loaded.sources,
            vec![
                ConfigSource::Global(global_path),
                ConfigSource::Project(root.join(CONFIG_FILE_NAME)),
                ConfigSource::Environment(ENV_LOG.to_string()),
                ConfigSource::CommandLine,
            ]
        );
    }

    #[test]
    fn test_load_without_global_or_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let root = utf8_dir(&temp_dir);
        std::fs::write(root.join(CONFIG_FILE_NAME), "").unwrap();

        let loaded = ConfigLoader::new(root.clone())
            .with_global_path(root.join("missing.toml"))
            .load(HashMap::new(), HashMap::new())
            .unwrap();

        assert_eq!(loaded.sources, vec![ConfigSource::Project(root.join(CONFIG_FILE_NAME))]);
        assert_eq!(loaded.config, SproutToml::default());
    }

    #[test]
    fn test_merge_configs() {
        let mut global = SproutToml::default();
        global.settings.log = Some("warn".to_string());
        global.settings.lockfile = Some("global.lock".into());
        global.packages.insert(
            "base".to_string(),
            PackageEntry {
                versions: vec!["9.0".to_string()],
                ..PackageEntry::default()
            },
        );
        global.packages.insert(
            "extra".to_string(),
            PackageEntry {
                versions: vec!["1.0".to_string()],
                ..PackageEntry::default()
            },
        );

        let merged = ConfigLayering::merge_configs(
            Some(global),
            create_test_config(),
            HashMap::new(),
            HashMap::new(),
        )
        .unwrap();

        assert_eq!(merged.settings.lockfile(), Utf8PathBuf::from("project.lock"));
        assert_eq!(merged.settings.log(), "warn");
        assert_eq!(merged.packages["base"].versions, vec!["1.0"]);
        assert!(merged.packages.contains_key("extra"));
    }

    #[test]
    fn test_override_priority() {
        let env = HashMap::from([
            (ENV_LOCKFILE.to_string(), "env.lock".to_string()),
            (ENV_LOG.to_string(), "debug".to_string()),
            ("SPROUT_UNRELATED".to_string(), "x".to_string()),
        ]);
        let cli = HashMap::from([(OVERRIDE_LOG.to_string(), "trace".to_string())]);

        let merged = ConfigLayering::new()
            .with_project(create_test_config())
            .with_env_overrides(env)
            .with_cli_overrides(cli)
            .build()
            .unwrap();

        assert_eq!(merged.settings.lockfile(), Utf8PathBuf::from("env.lock"));
        assert_eq!(merged.settings.log(), "trace");
    }

    #[test]
    fn test_empty_override_rejected() {
        let env = HashMap::from([(ENV_LOG.to_string(), " ".to_string())]);

        let err = ConfigLayering::new().with_env_overrides(env).build().unwrap_err();
        assert!(matches!(err, SproutError::ConfigValidation { ref field, .. } if field == ENV_LOG));
    }

    #[test]
    fn test_collect_env_overrides() {
        std::env::set_var("SPROUT_CONFIG_TEST_MARKER", "1");

        let overrides = ConfigLayering::collect_env_overrides();

        assert_eq!(overrides.get("SPROUT_CONFIG_TEST_MARKER").map(String::as_str), Some("1"));
        assert!(overrides.keys().all(|key| key.starts_with("SPROUT_")));
    }
}
