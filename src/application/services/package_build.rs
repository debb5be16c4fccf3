//! Package build coordination and artifact caching.
//!
//! The artifact path is a pure function of the request key, so an
//! existing file short-circuits the build entirely. Misses are built
//! under a per-key in-flight lock: identical requests collapse onto
//! one execution while unrelated packages build concurrently.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use tracing::{debug, info, warn};

use crate::application::ports::{LibraryCatalog, ResourceLister};
use crate::domain::{PackageArtifact, PackageError, PackageRequest, PackageVariant, PackagerConfig};
use crate::infra::archive::{self, ArchiveContents};
use crate::infra::{render, resolve};

/// Builds, caches, and serves package artifacts.
pub struct Packager<R, L> {
    config: PackagerConfig,
    resources: R,
    libraries: L,
    inflight: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl<R: ResourceLister, L: LibraryCatalog> Packager<R, L> {
    pub fn new(config: PackagerConfig, resources: R, libraries: L) -> Self {
        Self {
            config,
            resources,
            libraries,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Deterministic artifact path for a request.
    pub fn artifact_path(&self, request: &PackageRequest) -> PathBuf {
        self.config
            .download_dir()
            .join(request.artifact_file_name(&self.config.version))
    }

    /// Return the cached artifact for this request, building it on a miss.
    ///
    /// # Errors
    ///
    /// Returns a [`PackageError`] if any build step fails; no partial
    /// artifact is left behind.
    pub fn create_package(&self, request: &PackageRequest) -> Result<PackageArtifact, PackageError> {
        let target = self.artifact_path(request);
        if let Some(artifact) = existing_artifact(&target) {
            debug!(path = %target.display(), "package already built, reusing");
            return Ok(artifact);
        }

        let slot = self.inflight_slot(&target);
        let result = {
            let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
            self.build_locked(request, &target)
        };
        self.release_slot(&target, &slot);
        result
    }

    /// Agent package with no region, address, or owner, connecting back
    /// on the configured controller port.
    ///
    /// # Errors
    ///
    /// Returns a [`PackageError`] if the build fails.
    pub fn create_agent_package(&self) -> Result<PackageArtifact, PackageError> {
        self.create_package(&PackageRequest::bare(
            PackageVariant::Agent,
            self.config.controller_port,
        ))
    }

    /// Agent package for the given connection parameters. Always builds
    /// the agent variant.
    ///
    /// # Errors
    ///
    /// Returns a [`PackageError`] if the build fails.
    pub fn create_agent_package_with(
        &self,
        region: Option<String>,
        controller_host: Option<String>,
        controller_port: u16,
        owner: Option<String>,
    ) -> Result<PackageArtifact, PackageError> {
        self.create_package(&PackageRequest {
            variant: PackageVariant::Agent,
            region,
            controller_host,
            controller_port,
            owner,
            for_windows: false,
        })
    }

    fn build_locked(
        &self,
        request: &PackageRequest,
        target: &Path,
    ) -> Result<PackageArtifact, PackageError> {
        // Another request for the same key may have finished while we
        // waited on the slot.
        if let Some(artifact) = existing_artifact(target) {
            debug!(path = %target.display(), "package built while waiting, reusing");
            return Ok(artifact);
        }
        if target.exists() {
            if let Err(e) = std::fs::remove_file(target) {
                warn!(path = %target.display(), error = %e, "cannot remove stale artifact");
            }
        }

        self.build_archive(request, target)?;

        existing_artifact(target).ok_or_else(|| {
            PackageError::resolution(format!("built artifact missing at {}", target.display()))
        })
    }

    fn build_archive(&self, request: &PackageRequest, target: &Path) -> Result<(), PackageError> {
        let descriptor = request.variant.descriptor();
        let profile = request.variant.profile();

        let mut scripts = self.resources.list(descriptor.script_prefix)?;
        if scripts.is_empty() {
            return Err(PackageError::resolution(format!(
                "no launch scripts under '{}'",
                descriptor.script_prefix
            )));
        }
        scripts.sort_by(|a, b| a.name.cmp(&b.name));

        let declared = resolve::declared_libraries(&self.resources, request.variant)?;
        let mut seen = HashSet::new();
        let mut libraries = Vec::new();
        for path in self.libraries.library_files()? {
            if !resolve::is_jar(&path) {
                continue;
            }
            let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().into_owned())
            else {
                continue;
            };
            if !resolve::is_dependent_library(&file_name, &declared) {
                continue;
            }
            if !seen.insert(resolve::normalized_name(&file_name)) {
                debug!(library = %file_name, "duplicate qualifier for library, skipping");
                continue;
            }
            libraries.push(path);
        }

        let rendered_config = if profile.embeds_config(request) {
            Some(render::render(
                &self.resources,
                descriptor.template_name,
                &profile.config_params(request),
            )?)
        } else {
            None
        };

        archive::write_package(
            descriptor,
            target,
            &ArchiveContents {
                scripts: &scripts,
                libraries: &libraries,
                rendered_config: rendered_config.as_deref(),
            },
        )?;
        info!(
            module = descriptor.module_name,
            path = %target.display(),
            libraries = libraries.len(),
            scripts = scripts.len(),
            "package built"
        );
        Ok(())
    }

    fn inflight_slot(&self, target: &Path) -> Arc<Mutex<()>> {
        let mut map = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        map.entry(target.to_path_buf()).or_default().clone()
    }

    fn release_slot(&self, target: &Path, slot: &Arc<Mutex<()>>) {
        let mut map = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        // The map holds one reference and we hold another; anything more
        // means another request is still waiting on this key.
        if Arc::strong_count(slot) <= 2 {
            map.remove(target);
        }
    }
}

fn existing_artifact(path: &Path) -> Option<PackageArtifact> {
    let metadata = std::fs::metadata(path).ok()?;
    if !metadata.is_file() {
        return None;
    }
    Some(PackageArtifact {
        path: path.to_path_buf(),
        last_modified: metadata.modified().unwrap_or_else(|_| SystemTime::now()),
    })
}

// ── Unit tests ───────────────────────────────────────────────────────────────
