//! Application services — package build coordination and artifact eviction.

pub mod eviction;
pub mod package_build;

pub use eviction::EvictionSweeper;
pub use package_build::Packager;
