//! Typed errors surfaced by the packager core.
//!
//! Any of these aborts the build in progress; a failed build never
//! leaves a file at the deterministic artifact path.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building or caching a package.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("dependency manifest '{name}' is missing or unreadable")]
    ManifestRead { name: String },

    #[error("template '{name}' failed to render: {reason}")]
    TemplateRender { name: String, reason: String },

    #[error("error while writing archive {}", path.display())]
    ArchiveWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("resource resolution failed: {reason}")]
    ResourceResolution { reason: String },
}

impl PackageError {
    /// Shorthand for a [`PackageError::ResourceResolution`] with a formatted reason.
    pub fn resolution(reason: impl Into<String>) -> Self {
        Self::ResourceResolution {
            reason: reason.into(),
        }
    }
}
