//! Scratch files for the package normalization pass.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A uniquely named scratch directory holding one normalized package.
///
/// The directory (intermediate file, source map and anything else the
/// normalizer wrote there) is removed when the guard drops.
#[derive(Debug)]
pub struct ScratchEntry {
    dir: TempDir,
    path: PathBuf,
}

impl ScratchEntry {
    /// Create `<root>/<package_name>-<random>/` and pick the file name inside it.
    pub fn create(root: &Path, package_name: &str) -> io::Result<Self> {
        fs::create_dir_all(root)?;
        let dir = tempfile::Builder::new()
            .prefix(&format!("{package_name}-"))
            .tempdir_in(root)?;

        // Keep an ESM extension so the primary bundler parses it as a module
        let file_name = if package_name.ends_with(".js") || package_name.ends_with(".mjs") {
            package_name.to_string()
        } else {
            format!("{package_name}.mjs")
        };
        let path = dir.path().join(file_name);

        Ok(Self { dir, path })
    }

    /// Where the normalizer writes and the primary bundler reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The owning scratch directory.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}
