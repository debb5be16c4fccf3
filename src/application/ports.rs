//! Port trait definitions for the application layer.
//!
//! Ports are the contracts infrastructure must fulfill. This file
//! imports only from `crate::domain` — never from `crate::infra` or
//! `crate::commands`.

use std::borrow::Cow;
use std::path::PathBuf;

use crate::domain::PackageError;

/// A named byte stream, as surfaced by a [`ResourceLister`].
#[derive(Debug, Clone)]
pub struct NamedResource {
    /// Full resource name, e.g. `scripts/agent/run_agent.sh`.
    pub name: String,
    pub bytes: Cow<'static, [u8]>,
}

impl NamedResource {
    /// Final path segment of the resource name.
    pub fn file_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

/// Enumerates named resources bundled with the running controller.
///
/// Scripts, templates, and dependency manifests all come through this
/// port; how they are carried (embedded, on disk) is an infra concern.
pub trait ResourceLister {
    /// All resources directly under `prefix`, e.g. `scripts/agent`.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix cannot be enumerated.
    fn list(&self, prefix: &str) -> Result<Vec<NamedResource>, PackageError>;

    /// A single resource by full name.
    ///
    /// # Errors
    ///
    /// Returns an error if no resource with that name exists.
    fn get(&self, name: &str) -> Result<Cow<'static, [u8]>, PackageError>;
}

/// Lists the candidate runtime library files available for bundling.
pub trait LibraryCatalog {
    /// Paths of every file in the runtime library directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    fn library_files(&self) -> Result<Vec<PathBuf>, PackageError>;
}
