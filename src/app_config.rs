use crate::registry::{Ide, SchemaRegistry};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct AppConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultConfig>,
    /// Config file locations that replace the built-in ones, keyed by IDE id
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub paths: BTreeMap<String, PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct DefaultConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Ide>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<bool>,
}

impl AppConfig {
    /// Load the application configuration from the default path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Unable to determine the config directory
    /// - Unable to read the config file (other than it not existing)
    /// - The config file contains invalid TOML
    pub fn load() -> Result<Option<Self>> {
        Self::load_from(Self::config_path()?)
    }

    /// Load the application configuration from a specific file
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let config_path = path.as_ref();

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config at {}", config_path.display()))?;

        Ok(Some(config))
    }

    /// Get the path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if unable to determine the config directory
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
            Ok(PathBuf::from(config_home).join("mcp-ferry").join("config.toml"))
        } else if let Some(proj_dirs) = ProjectDirs::from("", "", "mcp-ferry") {
            Ok(proj_dirs.config_dir().join("config.toml"))
        } else {
            anyhow::bail!("Could not determine config directory")
        }
    }

    pub fn default_backup(&self) -> bool {
        self.default.as_ref().and_then(|d| d.backup).unwrap_or(true)
    }

    pub fn default_from(&self) -> Option<Ide> {
        self.default.as_ref().and_then(|d| d.from)
    }

    /// Build a schema registry for `home` with this config's path overrides applied
    ///
    /// # Errors
    ///
    /// Returns an error if an override names an unknown IDE.
    pub fn registry<P: Into<PathBuf>>(&self, home: P) -> Result<SchemaRegistry> {
        self.paths.iter().try_fold(
            SchemaRegistry::new(home),
            |registry, (ide_id, path)| -> Result<SchemaRegistry> {
                let ide: Ide = ide_id
                    .parse()
                    .with_context(|| format!("Invalid [paths] entry '{ide_id}' in config"))?;
                Ok(registry.with_override(ide, path))
            },
        )
    }
}
