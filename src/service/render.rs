//! Render service for orchestrating configuration assembly
//!
//! Loads settings and environment, assembles the hub configuration,
//! validates it, and writes it in the requested format.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use crate::{
    auth::AuthProvider,
    config::Config,
    env::MapEnv,
    hub::{HubConfig, Sources},
    render::OutputFormat,
    users::UserListPolicy,
};

/// Inputs for a render or check operation
#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
    pub config_dir: PathBuf,
    pub image_list: Option<PathBuf>,
    pub user_list: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    pub settings: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub user_list_policy: Option<UserListPolicy>,
    pub output: Option<PathBuf>,
}

impl RenderRequest {
    fn sources(&self) -> Sources {
        let defaults = Sources::in_dir(&self.config_dir);
        Sources {
            image_list: self.image_list.clone().unwrap_or(defaults.image_list),
            user_list: self.user_list.clone().unwrap_or(defaults.user_list),
            module_dir: defaults.module_dir,
        }
    }
}

/// Result of a render operation
pub struct RenderResult {
    /// Rendered text when no output file was requested
    pub rendered: Option<String>,
}

/// Short description of a validated configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSummary {
    pub provider: AuthProvider,
    pub allowed_users: usize,
    pub admin_users: usize,
    pub images: usize,
}

impl std::fmt::Display for CheckSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ok: authenticator={} allowed_users={} admin_users={} images={}",
            self.provider, self.allowed_users, self.admin_users, self.images
        )
    }
}

/// Service for orchestrating configuration assembly
pub struct RenderService;

impl RenderService {
    /// Assemble, validate and render the configuration
    pub fn render(request: RenderRequest) -> Result<RenderResult> {
        let (settings, hub_config) = Self::load(&request)?;
        let format = request.format.unwrap_or(settings.format);

        let rendered = hub_config.render(format)?;

        match &request.output {
            Some(path) => {
                std::fs::write(path, &rendered)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!("Wrote {:?} configuration to {}", format, path.display());
                Ok(RenderResult { rendered: None })
            }
            None => Ok(RenderResult {
                rendered: Some(rendered),
            }),
        }
    }

    /// Assemble and validate the configuration without rendering it
    pub fn check(request: RenderRequest) -> Result<CheckSummary> {
        let (_, hub_config) = Self::load(&request)?;

        Ok(CheckSummary {
            provider: hub_config.authenticator.provider(),
            allowed_users: hub_config.users.allowed.len(),
            admin_users: hub_config.users.admins.len(),
            images: hub_config.spawner.allowed_images.len(),
        })
    }

    fn load(request: &RenderRequest) -> Result<(Config, HubConfig)> {
        let mut settings = Config::load(request.settings.as_deref())?;
        if let Some(policy) = request.user_list_policy {
            settings.user_list_policy = policy;
        }

        let mut env = MapEnv::from_process();
        if let Some(env_file) = &request.env_file {
            env.load_env_file(env_file)?;
        }

        let sources = request.sources();
        info!(
            "Assembling configuration from {} and {}",
            sources.image_list.display(),
            sources.user_list.display()
        );

        let hub_config = HubConfig::assemble(&env, &sources, &settings)
            .context("Failed to assemble hub configuration")?;
        hub_config
            .validate()
            .context("Hub configuration failed validation")?;

        Ok((settings, hub_config))
    }
}
