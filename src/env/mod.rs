//! Environment variable access
//!
//! Every setting is read through the [`Environment`] trait so assembly can run
//! against the live process environment or a fixed snapshot.

use crate::error::ConfigError;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;


/// Source of environment variables
pub trait Environment {
    /// Look up a variable, returning `None` when it is not set
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads the live process environment
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Snapshot of environment variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapEnv {
    vars: BTreeMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment, skipping variables that are not UTF-8
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => Some((key, value)),
                (key, _) => {
                    debug!("Skipping non UTF-8 environment variable {:?}", key);
                    None
                }
            })
            .collect()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) {
        self.vars.remove(name);
    }

    /// Merge a dotenv file. Variables already present keep their value.
    pub fn load_env_file(&mut self, path: &Path) -> Result<usize, ConfigError> {
        let env_file_error = |message: String| ConfigError::EnvFile {
            path: path.to_path_buf(),
            message,
        };

        let iter = dotenvy::from_path_iter(path).map_err(|e| env_file_error(e.to_string()))?;

        let mut added = 0;
        for item in iter {
            let (key, value) = item.map_err(|e| env_file_error(e.to_string()))?;
            if self.vars.contains_key(&key) {
                debug!("Keeping {} from process environment", key);
                continue;
            }
            self.vars.insert(key, value);
            added += 1;
        }

        debug!("Loaded {} variable(s) from {}", added, path.display());
        Ok(added)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Environment for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Fetch a variable that must be set to a non-empty value
pub fn require(env: &dyn Environment, name: &str, context: &str) -> Result<String, ConfigError> {
    optional(env, name).ok_or_else(|| ConfigError::MissingVar {
        var: name.to_string(),
        context: context.to_string(),
    })
}

/// Fetch a variable that must be set. An empty value is reported separately
/// from an absent one.
pub fn require_set(env: &dyn Environment, name: &str, context: &str) -> Result<String, ConfigError> {
    match env.var(name) {
        Some(value) if value.is_empty() => Err(ConfigError::EmptyVar {
            var: name.to_string(),
            context: context.to_string(),
        }),
        Some(value) => Ok(value),
        None => Err(ConfigError::MissingVar {
            var: name.to_string(),
            context: context.to_string(),
        }),
    }
}

/// Fetch a variable, treating an empty value as unset
pub fn optional(env: &dyn Environment, name: &str) -> Option<String> {
    env.var(name).filter(|v| !v.is_empty())
}

/// Fetch a variable, falling back to `default` only when it is absent
pub fn var_or(env: &dyn Environment, name: &str, default: &str) -> String {
    env.var(name).unwrap_or_else(|| default.to_string())
}
