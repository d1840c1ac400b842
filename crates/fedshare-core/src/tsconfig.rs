//! tsconfig discovery and reading.
//!
//! [`find_tsconfig`] walks from a mapping's path towards the filesystem root
//! and returns the first candidate it sees. Candidates are tried in priority
//! order at each level before ascending, so a library config next to the
//! source wins over a workspace-wide base config further up.

use crate::error::Error;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Candidate file names in priority order.
pub const TSCONFIG_CANDIDATES: &[&str] = &["tsconfig.lib.json", "tsconfig.json", "tsconfig.base.json"];

/// Find the nearest tsconfig at or above `start`.
///
/// `start` may be a file: joining a candidate onto a file path never exists,
/// so the walk simply ascends to the file's directory. Returns `None` once
/// the root has been checked.
#[must_use]
pub fn find_tsconfig(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        for name in TSCONFIG_CANDIDATES {
            let candidate = current.join(name);
            if candidate.exists() {
                return Some(candidate);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}

/// The subset of a tsconfig file fedshare reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TsConfig {
    #[serde(default)]
    pub compiler_options: CompilerOptions,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    pub base_url: Option<String>,
    #[serde(default)]
    pub paths: IndexMap<String, Vec<String>>,
}

/// Read a tsconfig file. Comments and trailing commas are accepted.
pub fn read_tsconfig(path: &Path) -> Result<TsConfig, Error> {
    let source = fedshare_util::fs::read_text(path).map_err(|source| Error::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;

    let json = strip_trailing_commas(&strip_comments(&source));
    serde_json::from_str(&json).map_err(|source| Error::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Strip single-line (//) and multi-line (/* */) comments outside strings.
fn strip_comments(source: &str) -> String {
    let mut result = String::with_capacity(source.len());
    let chars: Vec<char> = source.chars().collect();
    let len = chars.len();
    let mut i = 0;
    let mut in_string = false;

    while i < len {
        if in_string {
            result.push(chars[i]);
            if chars[i] == '\\' && i + 1 < len {
                result.push(chars[i + 1]);
                i += 2;
                continue;
            }
            if chars[i] == '"' {
                in_string = false;
            }
            i += 1;
        } else if i + 1 < len && chars[i] == '/' && chars[i + 1] == '/' {
            while i < len && chars[i] != '\n' {
                i += 1;
            }
        } else if i + 1 < len && chars[i] == '/' && chars[i + 1] == '*' {
            i += 2;
            while i + 1 < len && !(chars[i] == '*' && chars[i + 1] == '/') {
                // Keep line numbers stable for parse errors
                if chars[i] == '\n' {
                    result.push('\n');
                }
                i += 1;
            }
            i += 2;
        } else {
            if chars[i] == '"' {
                in_string = true;
            }
            result.push(chars[i]);
            i += 1;
        }
    }

    result
}

/// Drop commas directly followed (modulo whitespace) by `}` or `]`.
fn strip_trailing_commas(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut result = String::with_capacity(source.len());
    let mut in_string = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            result.push(c);
            if c == '\\' && i + 1 < chars.len() {
                result.push(chars[i + 1]);
                i += 2;
                continue;
            }
            if c == '"' {
                in_string = false;
            }
        } else if c == ',' {
            let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
            if !matches!(next, Some('}' | ']')) {
                result.push(c);
            }
        } else {
            if c == '"' {
                in_string = true;
            }
            result.push(c);
        }
        i += 1;
    }

    result
}
