//! Packager configuration.
//!
//! Loaded once at startup and passed into each component at
//! construction — nothing reads configuration through globals.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Well-known subdirectory of the platform home holding built artifacts.
pub const DOWNLOAD_DIR_NAME: &str = "download";

/// Top-level configuration stored in `~/.gridbench/packager.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackagerConfig {
    /// Platform home directory. Artifacts land in `<home>/download`.
    pub home: PathBuf,

    /// Directory holding the runtime library jars bundled into packages.
    pub lib_dir: PathBuf,

    /// Platform version stamped into every artifact filename.
    pub version: String,

    /// Controller port used when a build request does not name one.
    pub controller_port: u16,
}

impl Default for PackagerConfig {
    fn default() -> Self {
        let home = default_home();
        Self {
            lib_dir: home.join("lib"),
            home,
            version: env!("CARGO_PKG_VERSION").to_string(),
            controller_port: 16001,
        }
    }
}

impl PackagerConfig {
    /// Directory all built artifacts are written into and served from.
    pub fn download_dir(&self) -> PathBuf {
        self.home.join(DOWNLOAD_DIR_NAME)
    }
}

fn default_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".gridbench")
}

// ── Unit tests ───────────────────────────────────────────────────────────────
