//! Domain types for package building.
//!
//! Pure data and decision logic only — no I/O, no async, no filesystem
//! access. Everything here is exercised by the application services and
//! the infra layer.

pub mod config;
pub mod error;
pub mod package;

pub use config::PackagerConfig;
pub use error::PackageError;
pub use package::{PackageArtifact, PackageDescriptor, PackageRequest, PackageVariant};
