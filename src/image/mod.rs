//! Allowed notebook images

use crate::error::ConfigError;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};


/// Read the image list: one image tag per line, `#` starts a comment line
pub fn read_image_list(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ImageList {
        path: path.to_path_buf(),
        source,
    })?;

    let images = parse_image_list(&content);
    if images.is_empty() {
        return Err(ConfigError::EmptyImageList {
            path: path.to_path_buf(),
        });
    }

    info!("Loaded {} allowed image(s) from {}", images.len(), path.display());
    Ok(images)
}

/// Parse image list text, keeping the first occurrence of each tag
pub fn parse_image_list(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut images = Vec::new();

    for line in content.lines() {
        let tag = line.trim();
        if tag.is_empty() || tag.starts_with('#') {
            continue;
        }
        if !seen.insert(tag) {
            debug!("Skipping duplicate image {}", tag);
            continue;
        }
        images.push(tag.to_string());
    }

    images
}
