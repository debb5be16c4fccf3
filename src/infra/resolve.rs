//! Dependency manifest parsing and library matching.
//!
//! A manifest declares library names without versions. Candidate files
//! from the runtime library directory are matched by stripping their
//! version and qualifier suffixes and testing membership in the
//! declared set.

use std::collections::HashSet;
use std::path::Path;

use crate::application::ports::ResourceLister;
use crate::domain::{PackageError, PackageVariant};

/// Resource namespace the dependency manifests live under.
pub const MANIFEST_NAMESPACE: &str = "dependencies";

/// Legacy embedded engine jar, never bundled regardless of the manifest.
pub const LEGACY_ENGINE_JAR: &str = "bench-engine-3.9.1.jar";

/// Declared library set for a variant: parsed manifest plus the
/// variant's unconditional extra modules.
///
/// # Errors
///
/// Returns [`PackageError::ManifestRead`] if the manifest resource is
/// missing or not valid UTF-8. This aborts the build; there is no
/// silent fallback to an empty set.
pub fn declared_libraries(
    lister: &impl ResourceLister,
    variant: PackageVariant,
) -> Result<HashSet<String>, PackageError> {
    let name = format!("{MANIFEST_NAMESPACE}/{}", variant.descriptor().manifest_name);
    let bytes = lister
        .get(&name)
        .map_err(|_| PackageError::ManifestRead { name: name.clone() })?;
    let mut declared = parse_manifest(&bytes, &name)?;
    for extra in variant.profile().extra_libraries() {
        declared.insert((*extra).to_string());
    }
    Ok(declared)
}

/// Parse a semicolon-separated manifest into a set of declared names.
///
/// Entries are trimmed and have any `-SNAPSHOT` qualifier stripped.
///
/// # Errors
///
/// Returns [`PackageError::ManifestRead`] on non-UTF-8 content.
pub fn parse_manifest(bytes: &[u8], name: &str) -> Result<HashSet<String>, PackageError> {
    let text = std::str::from_utf8(bytes).map_err(|_| PackageError::ManifestRead {
        name: name.to_string(),
    })?;
    Ok(text
        .split(';')
        .map(|entry| entry.trim().replace("-SNAPSHOT", ""))
        .filter(|entry| !entry.is_empty())
        .collect())
}

/// Whether a candidate library file belongs in the package.
///
/// The legacy embedded engine jar is rejected outright; everything else
/// is matched by normalized name against the declared set.
pub fn is_dependent_library(filename: &str, declared: &HashSet<String>) -> bool {
    if filename.contains(LEGACY_ENGINE_JAR) {
        return false;
    }
    declared.contains(&normalized_name(filename))
}

/// A library filename with version and qualifier suffixes stripped.
///
/// `-SNAPSHOT` and `-GA` qualifiers go first; then the name is
/// truncated at its last `-` (separating name from version), falling
/// back to the last `.` (the file extension) for dashless names.
pub fn normalized_name(filename: &str) -> String {
    let name = filename.replace("-SNAPSHOT", "").replace("-GA", "");
    let end = name
        .rfind('-')
        .or_else(|| name.rfind('.'))
        .unwrap_or(name.len());
    name[..end].to_string()
}

/// Whether the path looks like a bundleable library file.
pub fn is_jar(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "jar")
}

// ── Unit tests ───────────────────────────────────────────────────────────────
