//! Package variants, descriptors, and build requests.
//!
//! A [`PackageVariant`] names one of the two distributable flavors
//! (agent, monitor). Its [`PackageDescriptor`] holds the static path
//! and resource metadata; variant-specific decisions live behind the
//! [`VariantProfile`] strategy so no caller branches on the variant.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::SystemTime;

// ── Constants ────────────────────────────────────────────────────────────────

/// Name of the configuration file embedded at the package base path.
pub const EMBEDDED_CONF_NAME: &str = "agent.conf";

/// Runtime modules always bundled into agent packages, manifest or not.
const AGENT_CORE_LIBRARIES: &[&str] = &["gridbench-core", "gridbench-runtime", "gridbench-harness"];

static AGENT_DESCRIPTOR: PackageDescriptor = PackageDescriptor {
    module_name: "gridbench-agent",
    base_path: "gridbench-agent/",
    lib_path: "gridbench-agent/lib/",
    script_prefix: "scripts/agent",
    template_name: "agent.conf",
    manifest_name: "agent.txt",
};

static MONITOR_DESCRIPTOR: PackageDescriptor = PackageDescriptor {
    module_name: "gridbench-monitor",
    base_path: "gridbench-monitor/",
    lib_path: "gridbench-monitor/lib/",
    script_prefix: "scripts/monitor",
    template_name: "monitor.conf",
    manifest_name: "monitor.txt",
};

// ── Variant and descriptor ───────────────────────────────────────────────────

/// One of the two distributable package flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageVariant {
    Agent,
    Monitor,
}

/// Static metadata for a package variant. Defined once at process start.
#[derive(Debug)]
pub struct PackageDescriptor {
    /// Module name, the first component of every artifact filename.
    pub module_name: &'static str,
    /// Directory the archive unpacks into, with trailing slash.
    pub base_path: &'static str,
    /// Library subdirectory inside the archive, with trailing slash.
    pub lib_path: &'static str,
    /// Resource prefix selecting the platform launch scripts to bundle.
    pub script_prefix: &'static str,
    /// Configuration template name within the template namespace.
    pub template_name: &'static str,
    /// Dependency manifest name within the manifest namespace.
    pub manifest_name: &'static str,
}

impl PackageVariant {
    pub fn descriptor(self) -> &'static PackageDescriptor {
        match self {
            Self::Agent => &AGENT_DESCRIPTOR,
            Self::Monitor => &MONITOR_DESCRIPTOR,
        }
    }

    pub fn profile(self) -> &'static dyn VariantProfile {
        match self {
            Self::Agent => &AgentProfile,
            Self::Monitor => &MonitorProfile,
        }
    }
}

// ── Build request ────────────────────────────────────────────────────────────

/// Inputs for one package build. Ephemeral, constructed per call.
#[derive(Debug, Clone)]
pub struct PackageRequest {
    pub variant: PackageVariant,
    /// Cluster region the agent reports into. Blank means unregioned.
    pub region: Option<String>,
    /// Controller address the agent connects back to.
    pub controller_host: Option<String>,
    pub controller_port: u16,
    /// User the package is built for, for owned (private) agents.
    pub owner: Option<String>,
    /// Selects the `.zip` artifact extension for Windows downloads.
    pub for_windows: bool,
}

impl PackageRequest {
    /// Request for the given variant with no region, address, or owner.
    pub fn bare(variant: PackageVariant, controller_port: u16) -> Self {
        Self {
            variant,
            region: None,
            controller_host: None,
            controller_port,
            owner: None,
            for_windows: false,
        }
    }

    /// Deterministic artifact filename for this request.
    ///
    /// Layout: `<module>-<version>[-region][-host][-owner].<tar|zip>`.
    /// Blank optional components are omitted entirely.
    pub fn artifact_file_name(&self, version: &str) -> String {
        let descriptor = self.variant.descriptor();
        let extension = if self.for_windows { "zip" } else { "tar" };
        format!(
            "{}-{}{}{}{}.{}",
            descriptor.module_name,
            version,
            filename_component(self.region.as_deref()),
            filename_component(self.controller_host.as_deref()),
            filename_component(self.owner.as_deref()),
            extension,
        )
    }
}

/// A hyphen-prefixed filename component, or nothing when the value is blank.
fn filename_component(value: Option<&str>) -> String {
    match trimmed(value) {
        "" => String::new(),
        value => format!("-{value}"),
    }
}

fn trimmed(value: Option<&str>) -> &str {
    value.unwrap_or_default().trim()
}

// ── Built artifact ───────────────────────────────────────────────────────────

/// A package file sitting in the artifact directory.
#[derive(Debug, Clone)]
pub struct PackageArtifact {
    pub path: PathBuf,
    pub last_modified: SystemTime,
}

// ── Variant strategies ───────────────────────────────────────────────────────

/// Variant-specific build decisions.
///
/// One implementation per [`PackageVariant`]; callers go through
/// [`PackageVariant::profile`] instead of matching on the variant.
pub trait VariantProfile: Sync {
    /// Flat parameter map fed to the configuration template.
    fn config_params(&self, request: &PackageRequest) -> BTreeMap<String, String>;

    /// Module names added to the declared dependency set unconditionally.
    fn extra_libraries(&self) -> &'static [&'static str];

    /// Whether the rendered configuration is embedded into the archive.
    fn embeds_config(&self, request: &PackageRequest) -> bool;
}

pub struct AgentProfile;

impl VariantProfile for AgentProfile {
    fn config_params(&self, request: &PackageRequest) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert(
            "controllerIP".to_string(),
            trimmed(request.controller_host.as_deref()).to_string(),
        );
        params.insert(
            "controllerPort".to_string(),
            request.controller_port.to_string(),
        );
        params.insert(
            "controllerRegion".to_string(),
            compose_region(
                trimmed(request.region.as_deref()),
                trimmed(request.owner.as_deref()),
            ),
        );
        params
    }

    fn extra_libraries(&self) -> &'static [&'static str] {
        AGENT_CORE_LIBRARIES
    }

    fn embeds_config(&self, request: &PackageRequest) -> bool {
        !trimmed(request.controller_host.as_deref()).is_empty()
    }
}

pub struct MonitorProfile;

impl VariantProfile for MonitorProfile {
    fn config_params(&self, request: &PackageRequest) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert(
            "monitorPort".to_string(),
            request.controller_port.to_string(),
        );
        params
    }

    fn extra_libraries(&self) -> &'static [&'static str] {
        &[]
    }

    fn embeds_config(&self, _request: &PackageRequest) -> bool {
        true
    }
}

/// Region value written into the agent configuration.
///
/// A blank region becomes the literal `NONE`. Owner suffixing keys off
/// the original blank check, not the defaulted value: a blank region
/// with an owner yields `owned_<owner>`, never `NONE_owned_<owner>`.
fn compose_region(region: &str, owner: &str) -> String {
    let originally_blank = region.is_empty();
    let mut composed = if originally_blank {
        "NONE".to_string()
    } else {
        region.to_string()
    };
    if !owner.is_empty() {
        composed = if originally_blank {
            format!("owned_{owner}")
        } else {
            format!("{composed}_owned_{owner}")
        };
    }
    composed
}

// ── Unit tests ───────────────────────────────────────────────────────────────
