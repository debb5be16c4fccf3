//! Application layer — ports and package build/eviction services.

pub mod ports;
pub mod services;
