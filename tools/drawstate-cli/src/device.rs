//! Device config loading shared by the commands

use std::path::Path;

use anyhow::{Context, Result};
use nether_drawstate::DrawStateConfig;

/// Load `path`, or fall back to the built-in defaults when no path is given
pub fn load_config(path: Option<&Path>) -> Result<DrawStateConfig> {
    match path {
        Some(path) => DrawStateConfig::load(path)
            .with_context(|| format!("Failed to load device config: {}", path.display())),
        None => {
            tracing::info!("No device config given, using defaults");
            Ok(DrawStateConfig::default())
        }
    }
}
