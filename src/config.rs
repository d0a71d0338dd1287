//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/skilltree/skilltree.toml`
//! 3. Local config: `<dir>/.skilltree.toml`
//! 4. Environment variables: `SKILLTREE_*` prefix

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Which `SkillStore` implementation backs the services.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// JSON snapshot at `Settings::store_path()`
    #[default]
    Json,
    /// In-process only, gone when the process exits
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(StoreBackend::Json),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(ApplicationError::Config {
                message: format!("unknown store backend: {other}"),
            }),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Json => f.write_str("json"),
            StoreBackend::Memory => f.write_str("memory"),
        }
    }
}

/// Raw settings for intermediate parsing (`None` = not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub base_dir: Option<PathBuf>,
    pub store: Option<StoreBackend>,
    pub root_name: Option<String>,
    pub default_owner: Option<String>,
}

/// Unified configuration for skilltree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Base directory for skilltree data (default: ~/.skilltree)
    pub base_dir: PathBuf,
    /// Store backend
    pub store: StoreBackend,
    /// Display name of the root provisioned for each owner
    pub root_name: String,
    /// Owner used when a command does not name one
    pub default_owner: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_dir: dirs_default_base_dir(),
            store: StoreBackend::default(),
            root_name: "Core".into(),
            default_owner: "local".into(),
        }
    }
}

/// Get the default base directory (~/.skilltree).
fn dirs_default_base_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".skilltree"))
        .unwrap_or_else(|| PathBuf::from("~/.skilltree"))
}

/// Get the XDG config directory for skilltree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "skilltree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("skilltree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".skilltree.toml")
}

/// Expand `~`, `$VAR` and `${VAR}`; unknown variables leave the input as is.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Location of the JSON snapshot (base_dir/skills.json).
    pub fn store_path(&self) -> PathBuf {
        self.base_dir.join("skills.json")
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.base_dir.to_string_lossy().as_ref());
        self.base_dir = PathBuf::from(expanded);
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            base_dir: overlay
                .base_dir
                .clone()
                .unwrap_or_else(|| self.base_dir.clone()),
            store: overlay.store.unwrap_or(self.store),
            root_name: overlay
                .root_name
                .clone()
                .unwrap_or_else(|| self.root_name.clone()),
            default_owner: overlay
                .default_owner
                .clone()
                .unwrap_or_else(|| self.default_owner.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.skilltree.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Apply SKILLTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("SKILLTREE").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("base_dir") {
            settings.base_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("store") {
            settings.store = val.parse()?;
        }
        if let Ok(val) = config.get_string("root_name") {
            settings.root_name = val;
        }
        if let Ok(val) = config.get_string("default_owner") {
            settings.default_owner = val;
        }

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.default_owner.trim().is_empty() {
            return Err(ApplicationError::Config {
                message: "default_owner must not be empty".into(),
            });
        }
        if self.root_name.trim().is_empty() {
            return Err(ApplicationError::Config {
                message: "root_name must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# skilltree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/skilltree/skilltree.toml
#   Local:  <dir>/.skilltree.toml
#   Env:    SKILLTREE_* environment variables

# Base directory for skilltree data (snapshot stored in base_dir/skills.json)
# base_dir = "~/.skilltree"

# Store backend: "json" or "memory"
# store = "json"

# Name of the root skill provisioned for every owner
# root_name = "Core"

# Owner used when a command does not pass --owner
# default_owner = "local"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_created_then_core_root_and_local_owner() {
        let settings = Settings::default();
        assert_eq!(settings.root_name, "Core");
        assert_eq!(settings.default_owner, "local");
        assert_eq!(settings.store, StoreBackend::Json);
        assert!(settings.store_path().ends_with("skills.json"));
    }

    #[test]
    fn given_tilde_in_base_dir_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            base_dir: PathBuf::from("~/.skilltree"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let base = settings.base_dir.to_string_lossy();
        assert!(base.starts_with(&home), "base_dir should start with home: {}", base);
        assert!(!base.contains('~'));
    }

    #[test]
    fn given_partial_overlay_when_merging_then_unspecified_fields_kept() {
        let base = Settings::default();
        let overlay = RawSettings {
            root_name: Some("Survival".into()),
            store: Some(StoreBackend::Memory),
            ..RawSettings::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.root_name, "Survival");
        assert_eq!(merged.store, StoreBackend::Memory);
        assert_eq!(merged.default_owner, base.default_owner);
        assert_eq!(merged.base_dir, base.base_dir);
    }

    #[test]
    fn given_backend_names_when_parsed_then_case_insensitive() {
        assert_eq!("JSON".parse::<StoreBackend>().unwrap(), StoreBackend::Json);
        assert_eq!(" memory ".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!("sqlite".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn given_template_when_parsed_then_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.root_name.is_none());
    }
}
