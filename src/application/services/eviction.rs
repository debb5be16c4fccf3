//! Artifact directory eviction.
//!
//! Built packages are cheap to regenerate, so the directory is wiped
//! at startup and swept on a fixed delay afterwards. Only plain files
//! directly inside the artifact directory are ever deleted.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use tracing::{debug, info, warn};

/// How long an artifact survives before it becomes eligible for eviction.
pub const RETENTION: Duration = Duration::from_secs(2 * 24 * 60 * 60);

/// Deletes stale artifacts from the artifact directory.
pub struct EvictionSweeper {
    artifact_dir: PathBuf,
}

impl EvictionSweeper {
    pub fn new(artifact_dir: impl Into<PathBuf>) -> Self {
        Self {
            artifact_dir: artifact_dir.into(),
        }
    }

    /// Delete artifacts older than the retention period, or all of them
    /// when `force` is set. Subdirectories are never touched. Deletion
    /// failures are logged per file and do not stop the sweep.
    ///
    /// Returns the number of files removed.
    pub fn sweep(&self, force: bool) -> usize {
        let entries = match std::fs::read_dir(&self.artifact_dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %self.artifact_dir.display(), error = %e, "artifact directory not readable, nothing to sweep");
                return 0;
            }
        };
        let now = SystemTime::now();
        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(metadata) = entry.metadata() else {
                warn!(path = %path.display(), "cannot stat artifact, skipping");
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            if force || expired(&metadata, now) {
                match std::fs::remove_file(&path) {
                    Ok(()) => {
                        info!(path = %path.display(), "evicted artifact");
                        removed += 1;
                    }
                    Err(e) => warn!(path = %path.display(), error = %e, "cannot evict artifact"),
                }
            }
        }
        removed
    }

    /// Wipe the directory now, then sweep by age once per retention period.
    ///
    /// Never returns; the embedding process spawns this as a background
    /// task alongside the build service.
    pub async fn run_startup_then_periodic(self) {
        self.sweep(true);
        let mut timer = tokio::time::interval(RETENTION);
        timer.tick().await; // the first tick completes immediately
        loop {
            timer.tick().await;
            self.sweep(false);
        }
    }
}

fn expired(metadata: &std::fs::Metadata, now: SystemTime) -> bool {
    metadata
        .modified()
        .ok()
        .and_then(|modified| now.duration_since(modified).ok())
        .is_some_and(|age| age > RETENTION)
}

// ── Unit tests ───────────────────────────────────────────────────────────────
