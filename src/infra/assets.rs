//! Embedded resources — scripts, templates, and dependency manifests
//! compiled into the controller binary.
//!
//! At compile time, `include_dir!` embeds everything under `assets/`:
//!   - `scripts/agent/*`, `scripts/monitor/*` — platform launch scripts
//!   - `templates/*.conf`                     — configuration templates
//!   - `dependencies/*.txt`                   — declared library manifests

use std::borrow::Cow;

use include_dir::{Dir, include_dir};

use crate::application::ports::{NamedResource, ResourceLister};
use crate::domain::PackageError;

static EMBEDDED_ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets");

/// [`ResourceLister`] over the assets embedded in the binary.
pub struct EmbeddedResources;

impl ResourceLister for EmbeddedResources {
    fn list(&self, prefix: &str) -> Result<Vec<NamedResource>, PackageError> {
        let dir = EMBEDDED_ASSETS
            .get_dir(prefix.trim_end_matches('/'))
            .ok_or_else(|| {
                PackageError::resolution(format!("no embedded resources under '{prefix}'"))
            })?;
        let mut resources: Vec<NamedResource> = dir
            .files()
            .map(|file| NamedResource {
                name: file.path().to_string_lossy().into_owned(),
                bytes: Cow::Borrowed(file.contents()),
            })
            .collect();
        resources.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(resources)
    }

    fn get(&self, name: &str) -> Result<Cow<'static, [u8]>, PackageError> {
        EMBEDDED_ASSETS
            .get_file(name)
            .map(|file| Cow::Borrowed(file.contents()))
            .ok_or_else(|| PackageError::resolution(format!("embedded resource not found: {name}")))
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_agent_scripts_sorted() {
        let scripts = EmbeddedResources.list("scripts/agent").expect("list");
        assert!(!scripts.is_empty());
        let names: Vec<&str> = scripts.iter().map(NamedResource::file_name).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert!(names.contains(&"run_agent.sh"));
    }

    #[test]
    fn lists_monitor_scripts() {
        let scripts = EmbeddedResources.list("scripts/monitor").expect("list");
        let names: Vec<&str> = scripts.iter().map(NamedResource::file_name).collect();
        assert!(names.contains(&"run_monitor.sh"));
    }

    #[test]
    fn unknown_prefix_errors() {
        assert!(EmbeddedResources.list("scripts/relay").is_err());
    }

    #[test]
    fn gets_templates_and_manifests_by_name() {
        for name in [
            "templates/agent.conf",
            "templates/monitor.conf",
            "dependencies/agent.txt",
            "dependencies/monitor.txt",
        ] {
            let bytes = EmbeddedResources.get(name).expect("get");
            assert!(!bytes.is_empty(), "{name} should not be empty");
        }
    }

    #[test]
    fn unknown_resource_errors() {
        assert!(EmbeddedResources.get("templates/relay.conf").is_err());
    }
}
