//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/notetree/notetree.toml`
//! 3. Local config: file passed with `--config`
//! 4. Environment variables: `NOTETREE_*` prefix, `__` between sections

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Behaviour of the node store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoreConfig {
    /// First sequence value of every child list
    pub sequence_base: i64,
    /// Renumber the former parent's children after `remove_subtree`
    pub renumber_on_remove: bool,
    /// Give new nodes without a creation timestamp the current time
    pub stamp_new_nodes: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sequence_base: 1,
            renumber_on_remove: false,
            stamp_new_nodes: true,
        }
    }
}

/// Terminal rendering options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Print node ids next to names
    pub show_ids: bool,
    /// Colored output (NO_COLOR still wins)
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_ids: true,
            color: true,
        }
    }
}

/// Raw store section: `None` means "not specified, inherit".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawStoreConfig {
    pub sequence_base: Option<i64>,
    pub renumber_on_remove: Option<bool>,
    pub stamp_new_nodes: Option<bool>,
}

/// Raw display section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDisplayConfig {
    pub show_ids: Option<bool>,
    pub color: Option<bool>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub store: RawStoreConfig,
    pub display: RawDisplayConfig,
}

/// Unified configuration for notetree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    pub store: StoreConfig,
    pub display: DisplayConfig,
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

/// Get the XDG config directory for notetree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "notetree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("notetree.toml"))
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
    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            store: StoreConfig {
                sequence_base: overlay
                    .store
                    .sequence_base
                    .unwrap_or(self.store.sequence_base),
                renumber_on_remove: overlay
                    .store
                    .renumber_on_remove
                    .unwrap_or(self.store.renumber_on_remove),
                stamp_new_nodes: overlay
                    .store
                    .stamp_new_nodes
                    .unwrap_or(self.store.stamp_new_nodes),
            },
            display: DisplayConfig {
                show_ids: overlay.display.show_ids.unwrap_or(self.display.show_ids),
                color: overlay.display.color.unwrap_or(self.display.color),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Optional local config file; it must exist when given
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(local_path) = local {
            let raw = load_raw_settings(local_path)?;
            current = current.merge_with(&raw);
        }

        current = Self::apply_env_overrides(current)?;
        current.check()?;
        Ok(current)
    }

    /// Apply NOTETREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("NOTETREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_int("store.sequence_base") {
            settings.store.sequence_base = val;
        }
        if let Ok(val) = config.get_bool("store.renumber_on_remove") {
            settings.store.renumber_on_remove = val;
        }
        if let Ok(val) = config.get_bool("store.stamp_new_nodes") {
            settings.store.stamp_new_nodes = val;
        }
        if let Ok(val) = config.get_bool("display.show_ids") {
            settings.display.show_ids = val;
        }
        if let Ok(val) = config.get_bool("display.color") {
            settings.display.color = val;
        }
        Ok(settings)
    }

    fn check(&self) -> Result<(), ApplicationError> {
        if self.store.sequence_base < 0 {
            return Err(ApplicationError::Config {
                message: format!(
                    "store.sequence_base must not be negative, got {}",
                    self.store.sequence_base
                ),
            });
        }
        Ok(())
    }

    /// Render the effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: e.to_string(),
        })
    }
}
