//! Content digests for bundle output.
//!
//! A digest is the lowercase hex BLAKE3 hash of the bytes. Callers that name
//! files after content take a prefix with [`short_file_digest`].

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Hex length of a full BLAKE3 digest.
pub const FULL_HEX_LEN: usize = 64;

/// Digest everything `reader` yields.
///
/// # Errors
/// Propagates read errors.
pub fn digest_reader(mut reader: impl Read) -> io::Result<String> {
    let mut hasher = blake3::Hasher::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(hasher.finalize().to_hex().to_string())
}

/// Digest of a file's contents.
///
/// # Errors
/// A missing file surfaces as [`io::ErrorKind::NotFound`].
pub fn file_digest(path: &Path) -> io::Result<String> {
    digest_reader(File::open(path)?)
}

/// The first `len` hex characters of [`file_digest`], at most [`FULL_HEX_LEN`].
///
/// # Errors
/// Same as [`file_digest`].
pub fn short_file_digest(path: &Path, len: usize) -> io::Result<String> {
    let mut digest = file_digest(path)?;
    digest.truncate(len.min(FULL_HEX_LEN));
    Ok(digest)
}
