//! End-to-end package build flow against the embedded resources.

#![allow(clippy::expect_used)]

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use gridbench_packager::application::services::Packager;
use gridbench_packager::domain::{PackageRequest, PackageVariant, PackagerConfig};
use gridbench_packager::infra::assets::EmbeddedResources;
use gridbench_packager::infra::libraries::LibDirCatalog;

struct Fixture {
    _home: tempfile::TempDir,
    packager: Packager<EmbeddedResources, LibDirCatalog>,
}

/// A packager over a temp home whose lib dir holds the given jars.
fn fixture(jars: &[&str]) -> Fixture {
    let home = tempfile::tempdir().expect("tempdir");
    let lib_dir = home.path().join("lib");
    std::fs::create_dir_all(&lib_dir).expect("lib dir");
    for jar in jars {
        std::fs::write(lib_dir.join(jar), b"jar bytes").expect("write jar");
    }
    let config = PackagerConfig {
        home: home.path().to_path_buf(),
        lib_dir: lib_dir.clone(),
        version: "1.2.0".to_string(),
        controller_port: 16001,
    };
    let packager = Packager::new(config, EmbeddedResources, LibDirCatalog::new(lib_dir));
    Fixture {
        _home: home,
        packager,
    }
}

fn entries(path: &Path) -> Vec<(String, u32)> {
    let mut archive = tar::Archive::new(File::open(path).expect("open archive"));
    archive
        .entries()
        .expect("entries")
        .map(|entry| {
            let entry = entry.expect("entry");
            (
                entry.path().expect("path").to_string_lossy().into_owned(),
                entry.header().mode().expect("mode"),
            )
        })
        .collect()
}

fn entry_body(path: &Path, suffix: &str) -> String {
    let mut archive = tar::Archive::new(File::open(path).expect("open archive"));
    for entry in archive.entries().expect("entries") {
        let mut entry = entry.expect("entry");
        if entry
            .path()
            .expect("path")
            .to_string_lossy()
            .ends_with(suffix)
        {
            let mut body = String::new();
            entry.read_to_string(&mut body).expect("read entry");
            return body;
        }
    }
    panic!("no entry ending with {suffix}");
}

#[test]
fn agent_package_bundles_scripts_libraries_and_config() {
    let fx = fixture(&["slf4j-api-2.0.9.jar", "gridbench-core-1.2.0.jar"]);
    let request = PackageRequest {
        variant: PackageVariant::Agent,
        region: Some("east".into()),
        controller_host: Some("10.0.0.5".into()),
        controller_port: 16001,
        owner: Some("bob".into()),
        for_windows: false,
    };
    let artifact = fx.packager.create_package(&request).expect("build");
    assert!(
        artifact
            .path
            .file_name()
            .is_some_and(|n| n == "gridbench-agent-1.2.0-east-10.0.0.5-bob.tar")
    );

    let all = entries(&artifact.path);
    let names: Vec<&str> = all.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names[0], "gridbench-agent/");
    assert_eq!(names[1], "gridbench-agent/lib/");
    assert!(names.contains(&"gridbench-agent/run_agent.sh"));
    assert!(names.contains(&"gridbench-agent/lib/slf4j-api-2.0.9.jar"));
    assert!(names.contains(&"gridbench-agent/lib/gridbench-core-1.2.0.jar"));
    assert!(names.contains(&"gridbench-agent/agent.conf"));

    // Scripts are executable, libraries are not.
    for (name, mode) in &all {
        if name.ends_with(".sh") || name.ends_with(".bat") {
            assert_eq!(*mode, 0o755, "{name} should be executable");
        }
        if name.ends_with(".jar") {
            assert_eq!(*mode, 0o644, "{name} should not be executable");
        }
    }

    let conf = entry_body(&artifact.path, "agent.conf");
    assert!(conf.contains("agent.controller_host=10.0.0.5"));
    assert!(conf.contains("agent.controller_port=16001"));
    assert!(conf.contains("agent.region=east_owned_bob"));
}

#[test]
fn agent_package_without_address_has_no_config() {
    let fx = fixture(&[]);
    let request = PackageRequest::bare(PackageVariant::Agent, 16001);
    let artifact = fx.packager.create_package(&request).expect("build");
    let names: Vec<String> = entries(&artifact.path).into_iter().map(|(n, _)| n).collect();
    assert!(names.iter().all(|n| !n.ends_with("agent.conf")));
}

#[test]
fn monitor_package_embeds_port_config() {
    let fx = fixture(&["oshi-core-6.4.0.jar"]);
    let request = PackageRequest::bare(PackageVariant::Monitor, 13243);
    let artifact = fx.packager.create_package(&request).expect("build");
    let conf = entry_body(&artifact.path, "agent.conf");
    assert!(conf.contains("monitor.binding_port=13243"));
}

#[test]
fn rebuild_reuses_the_cached_artifact() {
    let fx = fixture(&["slf4j-api-2.0.9.jar"]);
    let request = PackageRequest::bare(PackageVariant::Monitor, 13243);
    let first = fx.packager.create_package(&request).expect("first");
    let first_modified = std::fs::metadata(&first.path)
        .expect("metadata")
        .modified()
        .expect("mtime");
    let second = fx.packager.create_package(&request).expect("second");
    let second_modified = std::fs::metadata(&second.path)
        .expect("metadata")
        .modified()
        .expect("mtime");
    assert_eq!(first.path, second.path);
    assert_eq!(first_modified, second_modified, "artifact must not be rewritten");
}

#[test]
fn concurrent_builds_for_one_key_produce_one_artifact() {
    let fx = fixture(&["slf4j-api-2.0.9.jar"]);
    let request = PackageRequest::bare(PackageVariant::Monitor, 13243);
    let paths: Vec<PathBuf> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let packager = &fx.packager;
                let request = request.clone();
                scope.spawn(move || packager.create_package(&request).expect("build").path)
            })
            .collect();
        handles.into_iter().map(|h| h.join().expect("join")).collect()
    });
    assert!(paths.windows(2).all(|pair| pair[0] == pair[1]));
    assert!(paths[0].is_file());
}

#[test]
fn unrelated_jars_are_left_out() {
    let fx = fixture(&["left-pad-1.0.0.jar", "slf4j-api-2.0.9.jar", "notes.txt"]);
    let request = PackageRequest::bare(PackageVariant::Monitor, 13243);
    let artifact = fx.packager.create_package(&request).expect("build");
    let names: Vec<String> = entries(&artifact.path).into_iter().map(|(n, _)| n).collect();
    assert!(names.iter().any(|n| n.ends_with("slf4j-api-2.0.9.jar")));
    assert!(names.iter().all(|n| !n.contains("left-pad")));
    assert!(names.iter().all(|n| !n.contains("notes.txt")));
}
