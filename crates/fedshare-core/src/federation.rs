//! Federation config loading and normalization.
//!
//! The config file is JSON (`federation.config.json` by default):
//!
//! ```json
//! {
//!   "sharedMappings": [{ "key": "@demo/auth", "path": "libs/auth/src/index.ts" }],
//!   "skip": ["@demo/legacy"],
//!   "externals": ["@angular/core", "rxjs"]
//! }
//! ```
//!
//! Without `sharedMappings`, mappings come from the root tsconfig's
//! `compilerOptions.paths`.

use crate::error::Error;
use crate::tsconfig::read_tsconfig;
use fedshare_util::fs::normalize_path;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the workspace root.
pub const CONFIG_FILE: &str = "federation.config.json";

/// A logical package name and the entry point that stands in for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedMapping {
    pub key: String,
    pub path: PathBuf,
}

impl SharedMapping {
    pub fn new(key: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            key: key.into(),
            path: path.into(),
        }
    }
}

/// Config file as written by the user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FederationConfigFile {
    /// Explicit mappings. `None` derives them from tsconfig paths.
    pub shared_mappings: Option<Vec<SharedMapping>>,
    /// Mapping keys to leave out.
    #[serde(default)]
    pub skip: Vec<String>,
    /// Module names kept external in every bundle.
    #[serde(default)]
    pub externals: Vec<String>,
}

/// Normalized config consumed by the shared-mapping bundler.
#[derive(Debug, Clone, Default)]
pub struct NormalizedFederationConfig {
    /// Mappings in configured order, paths absolute.
    pub shared_mappings: Vec<SharedMapping>,
    /// Externals from the config file, insertion ordered.
    pub externals: IndexSet<String>,
}

/// Find the config file in the workspace root.
#[must_use]
pub fn find_config_file(root: &Path) -> Option<PathBuf> {
    let path = root.join(CONFIG_FILE);
    path.is_file().then_some(path)
}

/// Load and normalize the federation config.
///
/// If `config_path` is `Some`, that file must exist. Otherwise the default
/// file is used when present, and an empty config when not.
pub fn load_config(
    root: &Path,
    config_path: Option<&Path>,
    root_tsconfig: &Path,
) -> Result<NormalizedFederationConfig, Error> {
    let path = match config_path {
        Some(p) => Some(if p.is_absolute() {
            p.to_path_buf()
        } else {
            root.join(p)
        }),
        None => find_config_file(root),
    };

    let file = match path {
        Some(path) => {
            let source = fedshare_util::fs::read_text(&path).map_err(|source| Error::ConfigRead {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&source).map_err(|source| Error::ConfigParse { path, source })?
        }
        None => FederationConfigFile::default(),
    };

    normalize_config(file, root, root_tsconfig)
}

/// Normalize a parsed config file.
pub fn normalize_config(
    file: FederationConfigFile,
    root: &Path,
    root_tsconfig: &Path,
) -> Result<NormalizedFederationConfig, Error> {
    let mappings = match file.shared_mappings {
        Some(mappings) => mappings
            .into_iter()
            .map(|m| SharedMapping {
                path: if m.path.is_absolute() {
                    normalize_path(&m.path)
                } else {
                    normalize_path(&root.join(m.path))
                },
                key: m.key,
            })
            .collect(),
        None if root_tsconfig.exists() => mappings_from_tsconfig(root_tsconfig)?,
        None => {
            tracing::debug!(tsconfig = %root_tsconfig.display(), "no tsconfig, no shared mappings");
            Vec::new()
        }
    };

    let shared_mappings = mappings
        .into_iter()
        .filter(|m| !file.skip.contains(&m.key))
        .collect();

    Ok(NormalizedFederationConfig {
        shared_mappings,
        externals: file.externals.into_iter().collect(),
    })
}

/// Derive mappings from `compilerOptions.paths`.
///
/// Wildcard keys are ignored; each remaining key maps to its first target,
/// resolved against `baseUrl` (default: the tsconfig's directory) with `.`
/// and `..` folded away.
pub fn mappings_from_tsconfig(tsconfig: &Path) -> Result<Vec<SharedMapping>, Error> {
    let config = read_tsconfig(tsconfig)?;
    let dir = tsconfig.parent().unwrap_or(Path::new("."));
    let base = match &config.compiler_options.base_url {
        Some(base_url) => dir.join(base_url),
        None => dir.to_path_buf(),
    };

    Ok(config
        .compiler_options
        .paths
        .into_iter()
        .filter(|(key, _)| !key.contains('*'))
        .filter_map(|(key, targets)| {
            let target = targets.into_iter().next()?;
            Some(SharedMapping::new(key, normalize_path(&base.join(target))))
        })
        .collect())
}
