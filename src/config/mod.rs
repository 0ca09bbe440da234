use crate::constants::{spawner, users};
use crate::error::ConfigError;
use crate::render::OutputFormat;
use crate::users::UserListPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;


/// Settings for hubconf itself, read from `config.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Behaviour when the user list cannot be read
    #[serde(default)]
    pub user_list_policy: UserListPolicy,

    /// Identity used when the user list falls back
    #[serde(default = "default_fallback_user")]
    pub fallback_user: String,

    /// Role tokens in the user list that grant admin rights
    #[serde(default = "default_admin_roles")]
    pub admin_roles: Vec<String>,

    /// Spawner class handed to the hub
    #[serde(default = "default_spawner_class")]
    pub spawner_class: String,

    /// Load the spawner class from `<module>.py` in the config directory
    #[serde(default = "default_true")]
    pub load_spawner_module: bool,

    /// Default output format
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_fallback_user() -> String {
    users::FALLBACK_USER.to_string()
}

fn default_admin_roles() -> Vec<String> {
    users::ADMIN_ROLES.iter().map(|r| r.to_string()).collect()
}

fn default_true() -> bool {
    true
}

fn default_spawner_class() -> String {
    spawner::CLASS.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_list_policy: UserListPolicy::default(),
            fallback_user: default_fallback_user(),
            admin_roles: default_admin_roles(),
            spawner_class: default_spawner_class(),
            load_spawner_module: true,
            format: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Load from an explicit path, or from the user config directory if present
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        debug!("No settings file found, using defaults");
        Ok(Config::default())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings_error = |message: String| ConfigError::Settings {
            path: path.to_path_buf(),
            message,
        };

        let content = std::fs::read_to_string(path).map_err(|e| settings_error(e.to_string()))?;
        let config: Config = toml::from_str(&content).map_err(|e| settings_error(e.to_string()))?;

        debug!("Loaded settings from {}", path.display());
        Ok(config)
    }

    fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hubconf").join("config.toml"))
    }
}
