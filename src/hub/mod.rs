//! Assembled hub configuration
//!
//! [`HubConfig`] is built in a single pass from the environment and the two
//! list files, then validated before anything is rendered.

use crate::auth::{self, AuthenticatorConfig};
use crate::config::Config;
use crate::constants::{files, hub};
use crate::env::{self, Environment};
use crate::error::ConfigError;
use crate::image::read_image_list;
use crate::spawner::{locate_module, MountKind, SpawnerConfig};
use crate::users::{load_user_list, UserList};
use std::path::{Path, PathBuf};
use tracing::{debug, info};


/// Variable naming an extra admin user
pub const ADMIN_VAR: &str = "JUPYTERHUB_ADMIN";

/// Fixed hub process settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubSettings {
    pub hub_ip: String,
    pub hub_port: u16,
    pub cookie_secret_file: String,
    pub db_url: String,
    pub admin_access: bool,
    pub default_url: String,
    pub check_for_updates_class: String,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            hub_ip: hub::IP.to_string(),
            hub_port: hub::PORT,
            cookie_secret_file: hub::COOKIE_SECRET_FILE.to_string(),
            db_url: hub::DB_URL.to_string(),
            admin_access: true,
            default_url: hub::DEFAULT_URL.to_string(),
            check_for_updates_class: hub::CHECK_FOR_UPDATES_CLASS.to_string(),
        }
    }
}

/// Locations of the image list, user list and local spawner module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sources {
    pub image_list: PathBuf,
    pub user_list: PathBuf,
    pub module_dir: PathBuf,
}

impl Sources {
    /// Default file names inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            image_list: dir.join(files::IMAGE_LIST),
            user_list: dir.join(files::USER_LIST),
            module_dir: dir.to_path_buf(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubConfig {
    pub hub: HubSettings,
    pub spawner: SpawnerConfig,
    pub authenticator: AuthenticatorConfig,
    pub users: UserList,
}

impl HubConfig {
    pub fn assemble(
        env: &dyn Environment,
        sources: &Sources,
        config: &Config,
    ) -> Result<Self, ConfigError> {
        let module_file = if config.load_spawner_module {
            Some(locate_module(&sources.module_dir, &config.spawner_class)?)
        } else {
            None
        };

        let images = read_image_list(&sources.image_list)?;
        let mut spawner = SpawnerConfig::from_env(env, &config.spawner_class, images)?;
        if let Some(path) = module_file {
            spawner = spawner.with_module_file(path);
        }

        let authenticator = auth::select_authenticator(env)?;

        let mut users = load_user_list(
            &sources.user_list,
            config.admin_roles.as_slice(),
            config.user_list_policy,
            &config.fallback_user,
        )?;
        if let Some(admin) = env::optional(env, ADMIN_VAR) {
            users = users.with_admin(&admin);
        }

        let config = Self {
            hub: HubSettings::default(),
            spawner,
            authenticator,
            users,
        };
        debug!("Assembled configuration: {:?}", config);
        Ok(config)
    }

    /// Check invariants before the configuration is handed out
    pub fn validate(&self) -> Result<(), ConfigError> {
        for kind in MountKind::ALL {
            if self.spawner.volume(kind).is_none() {
                return Err(ConfigError::Invalid(format!("missing {} volume", kind)));
            }
        }
        if self.spawner.volume_table().len() != MountKind::ALL.len() {
            return Err(ConfigError::Invalid(
                "volume host paths must be distinct".to_string(),
            ));
        }
        if self.spawner.allowed_images.is_empty() {
            return Err(ConfigError::Invalid("no allowed images".to_string()));
        }
        if self.hub.hub_port == 0 {
            return Err(ConfigError::Invalid("hub port must not be 0".to_string()));
        }

        let outsiders = self.users.admins_not_allowed();
        if !outsiders.is_empty() {
            info!(
                "Admin(s) not in the allowed user list: {}",
                outsiders.join(", ")
            );
        }

        Ok(())
    }
}
