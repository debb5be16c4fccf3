//! Tar archive assembly for distributable packages.
//!
//! Entries are written in a fixed order: directory markers, launch
//! scripts (executable), matched library files, then the rendered
//! configuration. The archive is staged in a temporary file beside the
//! target and moved into place only on success, so a failed build never
//! leaves a partial artifact at the deterministic path.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tar::{EntryType, Header};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::application::ports::NamedResource;
use crate::domain::package::EMBEDDED_CONF_NAME;
use crate::domain::{PackageDescriptor, PackageError};

/// Mode bits for bundled launch scripts.
pub const EXEC_FILE_MODE: u32 = 0o755;

/// Mode bits for libraries and the embedded configuration.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Everything that goes into one package archive.
pub struct ArchiveContents<'a> {
    /// Launch scripts, already sorted by name.
    pub scripts: &'a [NamedResource],
    /// Matched library files, already sorted by name.
    pub libraries: &'a [PathBuf],
    /// Rendered configuration text, when the variant embeds one.
    pub rendered_config: Option<&'a str>,
}

/// Write a package archive to `target`.
///
/// Creates the parent directory tree when absent.
///
/// # Errors
///
/// Returns [`PackageError::ArchiveWrite`] on any I/O failure and
/// [`PackageError::ResourceResolution`] when a library file cannot be
/// opened. In both cases nothing is left at `target`.
pub fn write_package(
    descriptor: &PackageDescriptor,
    target: &Path,
    contents: &ArchiveContents<'_>,
) -> Result<(), PackageError> {
    let parent = target.parent().ok_or_else(|| {
        PackageError::resolution(format!("artifact path {} has no parent", target.display()))
    })?;
    std::fs::create_dir_all(parent).map_err(|source| PackageError::ArchiveWrite {
        path: target.to_path_buf(),
        source,
    })?;

    let mut staging = NamedTempFile::new_in(parent).map_err(|source| {
        PackageError::ArchiveWrite {
            path: target.to_path_buf(),
            source,
        }
    })?;
    append_entries(staging.as_file_mut(), target, descriptor, contents)?;
    staging
        .persist(target)
        .map_err(|e| PackageError::ArchiveWrite {
            path: target.to_path_buf(),
            source: e.error,
        })?;
    debug!(target = %target.display(), "package archive written");
    Ok(())
}

fn append_entries(
    file: &mut File,
    target: &Path,
    descriptor: &PackageDescriptor,
    contents: &ArchiveContents<'_>,
) -> Result<(), PackageError> {
    let archive_write = |source: std::io::Error| PackageError::ArchiveWrite {
        path: target.to_path_buf(),
        source,
    };
    let mut builder = tar::Builder::new(BufWriter::new(file));

    append_directory(&mut builder, descriptor.base_path).map_err(archive_write)?;
    append_directory(&mut builder, descriptor.lib_path).map_err(archive_write)?;

    for script in contents.scripts {
        let entry_name = format!("{}{}", descriptor.base_path, script.file_name());
        append_bytes(&mut builder, &entry_name, &script.bytes, EXEC_FILE_MODE)
            .map_err(archive_write)?;
    }

    for library in contents.libraries {
        append_library(&mut builder, descriptor, library, target)?;
    }

    if let Some(config) = contents.rendered_config {
        let entry_name = format!("{}{}", descriptor.base_path, EMBEDDED_CONF_NAME);
        append_bytes(&mut builder, &entry_name, config.as_bytes(), DEFAULT_FILE_MODE)
            .map_err(archive_write)?;
    }

    let writer = builder.into_inner().map_err(archive_write)?;
    writer
        .into_inner()
        .map_err(std::io::IntoInnerError::into_error)
        .and_then(|file| file.flush())
        .map_err(archive_write)
}

fn append_library<W: Write>(
    builder: &mut tar::Builder<W>,
    descriptor: &PackageDescriptor,
    library: &Path,
    target: &Path,
) -> Result<(), PackageError> {
    let file_name = library
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let entry_name = format!("{}{}", descriptor.lib_path, file_name);
    let file = File::open(library).map_err(|e| {
        PackageError::resolution(format!("cannot open library {}: {e}", library.display()))
    })?;
    let size = file
        .metadata()
        .map_err(|e| {
            PackageError::resolution(format!("cannot stat library {}: {e}", library.display()))
        })?
        .len();
    let mut header = plain_header(EntryType::Regular, DEFAULT_FILE_MODE, size);
    builder
        .append_data(&mut header, Path::new(&entry_name), file)
        .map_err(|source| PackageError::ArchiveWrite {
            path: target.to_path_buf(),
            source,
        })
}

fn append_directory<W: Write>(builder: &mut tar::Builder<W>, path: &str) -> std::io::Result<()> {
    let mut header = plain_header(EntryType::Directory, EXEC_FILE_MODE, 0);
    builder.append_data(&mut header, Path::new(path), std::io::empty())
}

fn append_bytes<W: Write>(
    builder: &mut tar::Builder<W>,
    entry_name: &str,
    bytes: &[u8],
    mode: u32,
) -> std::io::Result<()> {
    let mut header = plain_header(EntryType::Regular, mode, bytes.len() as u64);
    builder.append_data(&mut header, Path::new(entry_name), bytes)
}

/// A GNU header with zeroed timestamps and ownership, for reproducible output.
fn plain_header(entry_type: EntryType, mode: u32, size: u64) -> Header {
    let mut header = Header::new_gnu();
    header.set_entry_type(entry_type);
    header.set_mode(mode);
    header.set_size(size);
    header.set_mtime(0);
    header.set_uid(0);
    header.set_gid(0);
    header
}

// ── Unit tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::borrow::Cow;
    use std::io::Read;

    use super::*;
    use crate::domain::PackageVariant;

    fn script(name: &str, body: &str) -> NamedResource {
        NamedResource {
            name: format!("scripts/agent/{name}"),
            bytes: Cow::Owned(body.as_bytes().to_vec()),
        }
    }

    fn entry_summaries(path: &Path) -> Vec<(String, u32, bool)> {
        let mut archive = tar::Archive::new(File::open(path).expect("open archive"));
        archive
            .entries()
            .expect("entries")
            .map(|entry| {
                let entry = entry.expect("entry");
                let header = entry.header();
                (
                    entry.path().expect("path").to_string_lossy().into_owned(),
                    header.mode().expect("mode"),
                    header.entry_type() == EntryType::Directory,
                )
            })
            .collect()
    }

    #[test]
    fn archive_layout_and_modes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let lib = dir.path().join("slf4j-api-2.0.9.jar");
        std::fs::write(&lib, b"jar bytes").expect("write lib");
        let target = dir.path().join("out/gridbench-agent-1.0.0.tar");

        let scripts = vec![script("run_agent.sh", "#!/bin/sh\n")];
        let libraries = vec![lib];
        let contents = ArchiveContents {
            scripts: &scripts,
            libraries: &libraries,
            rendered_config: Some("host=10.0.0.5\n"),
        };
        write_package(PackageVariant::Agent.descriptor(), &target, &contents)
            .expect("write package");

        let entries = entry_summaries(&target);
        let names: Vec<&str> = entries.iter().map(|(n, _, _)| n.as_str()).collect();
        assert_eq!(
            names,
            [
                "gridbench-agent/",
                "gridbench-agent/lib/",
                "gridbench-agent/run_agent.sh",
                "gridbench-agent/lib/slf4j-api-2.0.9.jar",
                "gridbench-agent/agent.conf",
            ]
        );
        // Directories and scripts are 0o755, libraries and config 0o644.
        assert_eq!(entries[0].1, EXEC_FILE_MODE);
        assert!(entries[0].2);
        assert_eq!(entries[2].1, EXEC_FILE_MODE);
        assert!(!entries[2].2);
        assert_eq!(entries[3].1, DEFAULT_FILE_MODE);
        assert_eq!(entries[4].1, DEFAULT_FILE_MODE);
    }

    #[test]
    fn config_entry_absent_when_not_embedded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("gridbench-agent-1.0.0.tar");
        let scripts = vec![script("run_agent.sh", "#!/bin/sh\n")];
        let contents = ArchiveContents {
            scripts: &scripts,
            libraries: &[],
            rendered_config: None,
        };
        write_package(PackageVariant::Agent.descriptor(), &target, &contents)
            .expect("write package");

        let entries = entry_summaries(&target);
        assert!(entries.iter().all(|(name, _, _)| !name.ends_with("agent.conf")));
    }

    #[test]
    fn script_bytes_survive_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("gridbench-agent-1.0.0.tar");
        let scripts = vec![script("run_agent.sh", "#!/bin/sh\necho agent\n")];
        let contents = ArchiveContents {
            scripts: &scripts,
            libraries: &[],
            rendered_config: None,
        };
        write_package(PackageVariant::Agent.descriptor(), &target, &contents)
            .expect("write package");

        let mut archive = tar::Archive::new(File::open(&target).expect("open"));
        let mut body = String::new();
        for entry in archive.entries().expect("entries") {
            let mut entry = entry.expect("entry");
            if entry.path().expect("path").ends_with("run_agent.sh") {
                entry.read_to_string(&mut body).expect("read entry");
            }
        }
        assert_eq!(body, "#!/bin/sh\necho agent\n");
    }

    #[test]
    fn missing_library_file_leaves_no_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("gridbench-agent-1.0.0.tar");
        let scripts = vec![script("run_agent.sh", "#!/bin/sh\n")];
        let libraries = vec![dir.path().join("not-there.jar")];
        let contents = ArchiveContents {
            scripts: &scripts,
            libraries: &libraries,
            rendered_config: None,
        };
        let err = write_package(PackageVariant::Agent.descriptor(), &target, &contents)
            .expect_err("must fail");
        assert!(matches!(err, PackageError::ResourceResolution { .. }));
        assert!(!target.exists(), "failed build must not leave an artifact");
    }
}
