//! Docker spawner settings
//!
//! Resolves the container command, network, volume mounts and container
//! environment for per-user notebook containers.

use crate::constants::spawner::{
    CREATE_USER, DEFAULT_NOTEBOOK_DIR, NB_GID, NB_UID, USERNAME_PLACEHOLDER,
};
use crate::env::{self, Environment};
use crate::error::ConfigError;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;


const CONTEXT: &str = "spawner";

/// Storage mounted into every notebook container
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MountKind {
    Work,
    Data,
    Shared,
    IsisData,
}

impl MountKind {
    /// Mount kinds in the order their variables are read
    pub const ALL: [MountKind; 4] = [
        MountKind::Work,
        MountKind::Shared,
        MountKind::Data,
        MountKind::IsisData,
    ];

    /// Variable holding the path inside the container
    pub fn container_var(&self) -> &'static str {
        match self {
            MountKind::Work => "NOTEBOOK_USERS_WORK_DIR",
            MountKind::Data => "NOTEBOOK_DATA_DIR",
            MountKind::Shared => "NOTEBOOK_USERS_SHARED_DIR",
            MountKind::IsisData => "NOTEBOOK_ISISDATA_DIR",
        }
    }

    /// Variable holding the path on the host
    pub fn host_var(&self) -> &'static str {
        match self {
            MountKind::Work => "HOST_USERS_WORK_BASEDIR",
            MountKind::Data => "HOST_DATA_DIR",
            MountKind::Shared => "HOST_USERS_SHARED_DIR",
            MountKind::IsisData => "HOST_ISISDATA_DIR",
        }
    }
}

impl fmt::Display for MountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MountKind::Work => "work",
            MountKind::Data => "data",
            MountKind::Shared => "shared",
            MountKind::IsisData => "isisdata",
        };
        f.write_str(name)
    }
}

/// A host path mounted at a container path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    pub kind: MountKind,
    pub host: String,
    pub container: String,
}

/// Container environment value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EnvValue {
    Str(String),
    Int(u32),
}

impl From<&str> for EnvValue {
    fn from(value: &str) -> Self {
        EnvValue::Str(value.to_string())
    }
}

impl From<u32> for EnvValue {
    fn from(value: u32) -> Self {
        EnvValue::Int(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnerConfig {
    pub class: String,
    /// File the spawner class is loaded from, when it is not installed on the hub
    pub module_file: Option<PathBuf>,
    pub allowed_images: Vec<String>,
    pub cmd: String,
    pub network_name: String,
    pub use_internal_ip: bool,
    pub notebook_dir: String,
    /// One entry per [`MountKind`], sorted by kind
    pub volumes: Vec<Volume>,
    pub extra_create_kwargs: BTreeMap<String, String>,
    pub environment: BTreeMap<String, EnvValue>,
    pub remove: bool,
    pub debug: bool,
}

impl SpawnerConfig {
    pub fn from_env(
        env: &dyn Environment,
        class: &str,
        allowed_images: Vec<String>,
    ) -> Result<Self, ConfigError> {
        let cmd = env::require_set(env, "NOTEBOOK_SPAWN_CMD", CONTEXT)?;
        let network_name = env::require_set(env, "DOCKER_NETWORK_NAME", CONTEXT)?;
        let notebook_dir = env::var_or(env, "NOTEBOOK_DIR", DEFAULT_NOTEBOOK_DIR);

        let volumes = resolve_volumes(env)?;
        let environment = container_environment(&volumes);

        Ok(Self {
            class: class.to_string(),
            module_file: None,
            allowed_images,
            cmd,
            network_name,
            use_internal_ip: true,
            notebook_dir,
            volumes,
            extra_create_kwargs: BTreeMap::from([("user".to_string(), CREATE_USER.to_string())]),
            environment,
            remove: true,
            debug: true,
        })
    }

    pub fn with_module_file(mut self, path: PathBuf) -> Self {
        self.module_file = Some(path);
        self
    }

    /// Module name of a spawner class loaded from a local file
    pub fn local_module(&self) -> Option<&str> {
        self.module_file.as_ref()?;
        self.class.rsplit_once('.').map(|(module, _)| module)
    }

    pub fn volume(&self, kind: MountKind) -> Option<&Volume> {
        self.volumes.iter().find(|v| v.kind == kind)
    }

    /// Host path to container path table
    pub fn volume_table(&self) -> BTreeMap<String, String> {
        self.volumes
            .iter()
            .map(|v| (v.host.clone(), v.container.clone()))
            .collect()
    }

    /// DockerSpawner attributes
    pub fn traits(&self) -> BTreeMap<String, Value> {
        BTreeMap::from([
            ("allowed_images".to_string(), json!(self.allowed_images)),
            ("cmd".to_string(), json!(self.cmd)),
            ("network_name".to_string(), json!(self.network_name)),
            ("use_internal_ip".to_string(), json!(self.use_internal_ip)),
            ("notebook_dir".to_string(), json!(self.notebook_dir)),
            ("volumes".to_string(), json!(self.volume_table())),
            (
                "extra_create_kwargs".to_string(),
                json!(self.extra_create_kwargs),
            ),
            ("environment".to_string(), json!(self.environment)),
            ("remove".to_string(), json!(self.remove)),
            ("debug".to_string(), json!(self.debug)),
        ])
    }
}

/// Find the `<module>.py` file that defines `class` inside `dir`
pub fn locate_module(dir: &Path, class: &str) -> Result<PathBuf, ConfigError> {
    let (module, _) = class.rsplit_once('.').ok_or_else(|| {
        ConfigError::Invalid(format!("spawner class {} has no module path", class))
    })?;

    let path = dir.join(format!("{}.py", module));
    if !path.is_file() {
        return Err(ConfigError::SpawnerModule { path });
    }

    debug!("Spawner module {}", path.display());
    Ok(path)
}

/// Resolve all four mounts. Two mounts may not share a host path.
pub fn resolve_volumes(env: &dyn Environment) -> Result<Vec<Volume>, ConfigError> {
    let mut volumes = Vec::with_capacity(MountKind::ALL.len());

    for kind in MountKind::ALL {
        let container = env::require_set(env, kind.container_var(), CONTEXT)?;
        let host_value = env::require_set(env, kind.host_var(), CONTEXT)?;

        let host = match kind {
            MountKind::Work => format!(
                "{}/{}",
                host_value.trim_end_matches('/'),
                USERNAME_PLACEHOLDER
            ),
            _ => host_value,
        };

        if let Some(existing) = volumes.iter().find(|v: &&Volume| v.host == host) {
            return Err(ConfigError::DuplicateVolume {
                host,
                first: existing.kind.to_string(),
                second: kind.to_string(),
            });
        }

        debug!("Volume {}: {} -> {}", kind, host, container);
        volumes.push(Volume {
            kind,
            host,
            container,
        });
    }

    volumes.sort_by_key(|v| v.kind);
    Ok(volumes)
}

fn container_environment(volumes: &[Volume]) -> BTreeMap<String, EnvValue> {
    let container_dir = |kind: MountKind| {
        volumes
            .iter()
            .find(|v| v.kind == kind)
            .map(|v| v.container.as_str())
            .unwrap_or_default()
    };
    let work_dir = container_dir(MountKind::Work);

    BTreeMap::from([
        ("CHOWN_HOME".to_string(), EnvValue::from("yes")),
        ("CHOWN_EXTRA".to_string(), EnvValue::from(work_dir)),
        ("CHOWN_HOME_OPTS".to_string(), EnvValue::from("-R")),
        ("NB_UID".to_string(), EnvValue::from(NB_UID)),
        ("NB_GID".to_string(), EnvValue::from(NB_GID)),
        ("WORK_DIR".to_string(), EnvValue::from(work_dir)),
        (
            "DATA_DIR".to_string(),
            EnvValue::from(container_dir(MountKind::Data)),
        ),
        (
            "ISISDATA_DIR".to_string(),
            EnvValue::from(container_dir(MountKind::IsisData)),
        ),
    ])
}
