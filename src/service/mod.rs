//! Service layer for configuration orchestration
//!
//! This module contains the service layer that loads inputs, assembles and
//! renders the configuration, separating concerns from the CLI layer in main.rs.

pub mod render;

pub use render::{CheckSummary, RenderRequest, RenderResult, RenderService};
