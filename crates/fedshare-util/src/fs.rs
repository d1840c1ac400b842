//! Filesystem helpers for config reads and output writes.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

const UTF8_BOM: char = '\u{feff}';

/// Read a text file, dropping a leading byte-order mark.
///
/// Invalid UTF-8 is replaced rather than rejected; editors on Windows
/// commonly save JSON configs with a BOM that JSON parsers refuse.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn read_text(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.strip_prefix(UTF8_BOM).unwrap_or(&text).to_string())
}

/// Write `bytes` to `path` so readers see either the old or the new file.
///
/// The data goes to a hidden sibling first and is then moved into place.
///
/// # Errors
/// Returns an error if writing or moving fails; the sibling is removed.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let staging = staging_path(path);

    let result = File::create(&staging)
        .and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        })
        .and_then(|()| replace_file(&staging, path));

    if result.is_err() {
        let _ = fs::remove_file(&staging);
    }
    result
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "out".to_string(), |n| n.to_string_lossy().into_owned());
    path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}

/// Move `from` to `to`, replacing `to` if it already exists.
///
/// After a successful call only `to` exists.
///
/// # Errors
/// Returns an error if `from` does not exist or the move fails.
pub fn replace_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        // Windows refuses to rename over an existing file
        Err(_) if cfg!(windows) && from.exists() && to.exists() => {
            fs::remove_file(to)?;
            fs::rename(from, to)
        }
        Err(e) => Err(e),
    }
}

/// Lexically clean a path: drop `.` components and fold `..` into the
/// preceding normal component. The filesystem is not consulted.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}
