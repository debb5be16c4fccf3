//! Runtime library directory scanning.

use std::path::PathBuf;

use crate::application::ports::LibraryCatalog;
use crate::domain::PackageError;

/// [`LibraryCatalog`] backed by a directory of runtime library jars.
pub struct LibDirCatalog {
    dir: PathBuf,
}

impl LibDirCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl LibraryCatalog for LibDirCatalog {
    fn library_files(&self) -> Result<Vec<PathBuf>, PackageError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| {
            PackageError::resolution(format!(
                "cannot read library directory {}: {e}",
                self.dir.display()
            ))
        })?;
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                PackageError::resolution(format!(
                    "cannot read library directory {}: {e}",
                    self.dir.display()
                ))
            })?;
            let path = entry.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
