//! Configuration system: YAML-based job-default loading (SPEC_FULL §2).
//!
//! Layered config: built-in defaults, then an optional `discovery.yml`
//! overlay, then `NETWALKER_*` environment overrides.

pub mod settings;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

pub use settings::JobDefaults;

/// Loads [`JobDefaults`], checking `config_dir` (or `NETWALKER_HOME`, or the
/// user's home directory) for an optional `discovery.yml` overlay.
pub fn load_config(config_dir: Option<&Path>) -> Result<JobDefaults> {
    let home = config_dir
        .map(PathBuf::from)
        .or_else(|| std::env::var("NETWALKER_HOME").ok().map(PathBuf::from))
        .or_else(dirs::home_dir)
        .context("cannot determine home directory")?;

    let overlay_path = home.join("discovery.yml");
    let mut defaults = JobDefaults::default();
    if overlay_path.exists() {
        let contents = std::fs::read_to_string(&overlay_path)
            .with_context(|| format!("failed to read {}", overlay_path.display()))?;
        let overrides: serde_yaml::Value = serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", overlay_path.display()))?;
        defaults.apply_overrides(&overrides)?;
        info!("loaded discovery config overrides from {}", overlay_path.display());
    }

    defaults.apply_env_overrides();
    Ok(defaults)
}
