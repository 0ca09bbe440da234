pub mod auth;
pub mod cli;
pub mod config;
pub mod constants;
pub mod env;
pub mod error;
pub mod hub;
pub mod image;
pub mod render;
pub mod service;
pub mod spawner;
pub mod users;

pub use anyhow::Result;
pub use error::ConfigError;
