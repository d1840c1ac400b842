//! Content addressing of bundle output.
//!
//! A bundle is named after a digest of its final bytes, so identical output
//! always lands at the same file name and any change produces a new one.

use fedshare_util::hash::short_file_digest;
use std::io;
use std::path::{Path, PathBuf};

/// Number of hex characters of the blake3 digest kept in file names.
pub const HASH_LEN: usize = 20;

/// A content-derived output location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressedFile {
    /// Hex digest of the file contents.
    pub hash: String,
    /// `<dir>/<base_name>-<hash>.js`, in the same directory as the built file.
    pub path: PathBuf,
}

impl AddressedFile {
    /// File name component of [`Self::path`].
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Compute the hashed location for an already-built file.
///
/// Does not move anything; see [`fedshare_util::fs::replace_file`].
///
/// # Errors
/// Fails with [`io::ErrorKind::NotFound`] if `built` does not exist.
pub fn addressed_filename(built: &Path, base_name: &str) -> io::Result<AddressedFile> {
    let hash = short_file_digest(built, HASH_LEN)?;
    let dir = built.parent().unwrap_or(Path::new("."));
    let path = dir.join(format!("{base_name}-{hash}.js"));
    Ok(AddressedFile { hash, path })
}
