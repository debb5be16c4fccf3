//! Configuration loading from a YAML file on disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::PackagerConfig;

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "GRIDPACK_CONFIG";

/// Load the packager configuration.
///
/// Resolution order: explicit `path` argument, the `GRIDPACK_CONFIG`
/// environment variable, then `~/.gridbench/packager.yaml`. A missing
/// file yields the defaults; a malformed file is an error.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load(path: Option<&Path>) -> Result<PackagerConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => default_path()?,
    };
    if !path.exists() {
        return Ok(PackagerConfig::default());
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
}

fn default_path() -> Result<PathBuf> {
    if let Ok(value) = std::env::var(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(value));
    }
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.join(".gridbench").join("packager.yaml"))
}

// ── Unit tests ───────────────────────────────────────────────────────────────
