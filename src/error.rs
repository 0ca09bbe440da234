//! Error types for configuration assembly

use std::path::PathBuf;
use thiserror::Error;

/// Failures that stop a configuration from being produced
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} environment variable is required for {context}")]
    MissingVar { var: String, context: String },

    #[error("{var} environment variable must not be empty for {context}")]
    EmptyVar { var: String, context: String },

    #[error("spawner module {} not found", .path.display())]
    SpawnerModule { path: PathBuf },

    #[error("failed to read image list {}: {source}", .path.display())]
    ImageList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image list {} contains no images", .path.display())]
    EmptyImageList { path: PathBuf },

    #[error("failed to read user list {}: {source}", .path.display())]
    UserList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("host path {host} is mapped by both the {first} and {second} volumes")]
    DuplicateVolume {
        host: String,
        first: String,
        second: String,
    },

    #[error("failed to load env file {}: {message}", .path.display())]
    EnvFile { path: PathBuf, message: String },

    #[error("failed to load settings {}: {message}", .path.display())]
    Settings { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Name of the missing variable, if this is a missing-variable error
    pub fn missing_var(&self) -> Option<&str> {
        match self {
            ConfigError::MissingVar { var, .. } => Some(var),
            _ => None,
        }
    }
}
