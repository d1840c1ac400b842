//! Shared-mapping bundler driver.
//!
//! Each configured mapping is bundled into a standalone ESM file, renamed
//! after a digest of its contents, and described by a [`SharedInfo`] record.
//! Mappings are processed one at a time, in configuration order. A failing
//! mapping is logged and skipped; it never aborts the batch.

use crate::adapter::{BuildAdapter, BundleAdapterOptions, BundleRequest};
use crate::address::addressed_filename;
use crate::config::FederationOptions;
use crate::error::{Error, MappingError};
use crate::federation::{NormalizedFederationConfig, SharedMapping};
use crate::tsconfig::find_tsconfig;
use fedshare_util::fs::replace_file;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Hint logged after a mapping fails.
pub const SKIP_HINT: &str =
    "If you don't need this mapping to be shared, you can skip it in your federation config";

/// Manifest record for one bundled mapping.
///
/// Mappings are presence-negotiated, not version-negotiated: they are always
/// singletons with empty version fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedInfo {
    pub package_name: String,
    pub out_file_name: String,
    pub required_version: String,
    pub singleton: bool,
    pub strict_version: bool,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<SharedDebugInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedDebugInfo {
    /// Source entry point, with `/` separators.
    pub entry_point: String,
}

impl SharedInfo {
    fn for_mapping(mapping: &SharedMapping, out_file_name: String, debug: bool) -> Self {
        Self {
            package_name: mapping.key.clone(),
            out_file_name,
            required_version: String::new(),
            singleton: true,
            strict_version: false,
            version: String::new(),
            debug: debug.then(|| SharedDebugInfo {
                entry_point: normalize_display_path(&mapping.path),
            }),
        }
    }
}

/// Result of bundling one mapping.
#[derive(Debug)]
pub struct MappingOutcome {
    pub key: String,
    pub result: Result<SharedInfo, MappingError>,
}

impl MappingOutcome {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// File-name form of a mapping key.
///
/// Every character outside `[A-Za-z0-9]` becomes `_`. Distinct keys can
/// collide (`@a/b-c` and `_a_b_c`); existing hashed names depend on this form.
#[must_use]
pub fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Path with `/` separators, for records that leave the machine.
#[must_use]
pub fn normalize_display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Bundle every shared mapping and return the records of the successful ones.
///
/// Failed mappings are logged and omitted.
pub async fn bundle_shared_mappings(
    config: &NormalizedFederationConfig,
    options: &FederationOptions,
    externals: &IndexSet<String>,
    adapter: &BuildAdapter,
) -> Result<Vec<SharedInfo>, Error> {
    let outcomes = bundle_shared_mappings_detailed(config, options, externals, adapter).await?;
    Ok(outcomes
        .into_iter()
        .filter_map(|outcome| outcome.result.ok())
        .collect())
}

/// Bundle every shared mapping, keeping one outcome per mapping in order.
///
/// Only failing to create the output directory is an error for the whole
/// batch.
pub async fn bundle_shared_mappings_detailed(
    config: &NormalizedFederationConfig,
    options: &FederationOptions,
    externals: &IndexSet<String>,
    adapter: &BuildAdapter,
) -> Result<Vec<MappingOutcome>, Error> {
    let output_dir = options.output_dir();
    tokio::fs::create_dir_all(&output_dir)
        .await
        .map_err(|source| Error::OutputDir {
            path: output_dir.clone(),
            source,
        })?;

    let mut outcomes = Vec::with_capacity(config.shared_mappings.len());

    for mapping in &config.shared_mappings {
        tracing::info!(key = %mapping.key, "Bundling shared mapping {}", mapping.key);

        let result = bundle_mapping(mapping, options, &output_dir, externals, adapter).await;

        if let Err(e) = &result {
            tracing::error!(key = %mapping.key, "Error bundling shared mapping {}", mapping.key);
            tracing::info!("{SKIP_HINT}");
            tracing::error!(
                key = %mapping.key,
                code = e.code(),
                backend_code = e.backend_code(),
                "{e}"
            );
        }

        outcomes.push(MappingOutcome {
            key: mapping.key.clone(),
            result,
        });
    }

    Ok(outcomes)
}

async fn bundle_mapping(
    mapping: &SharedMapping,
    options: &FederationOptions,
    output_dir: &Path,
    externals: &IndexSet<String>,
    adapter: &BuildAdapter,
) -> Result<SharedInfo, MappingError> {
    let outfile = unhashed_outfile(output_dir, &mapping.key);

    let result = build_and_address(mapping, options, &outfile, externals, adapter).await;

    // A failed mapping leaves nothing in the output directory
    if result.is_err() {
        match tokio::fs::remove_file(&outfile).await {
            Ok(()) => {
                tracing::debug!(path = %outfile.display(), "removed partial bundle");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %outfile.display(), error = %e, "failed to remove partial bundle");
            }
        }
    }

    result
}

async fn build_and_address(
    mapping: &SharedMapping,
    options: &FederationOptions,
    outfile: &Path,
    externals: &IndexSet<String>,
    adapter: &BuildAdapter,
) -> Result<SharedInfo, MappingError> {
    let base_name = sanitize_key(&mapping.key);

    let ts_config = find_tsconfig(&mapping.path).unwrap_or_else(|| options.default_tsconfig());
    tracing::debug!(key = %mapping.key, tsconfig = %ts_config.display(), "resolved tsconfig");

    let request = BundleRequest {
        entry_point: mapping.path.clone(),
        ts_config_path: Some(ts_config),
        external: externals.clone(),
        outfile: outfile.to_path_buf(),
        mapped_paths: Vec::new(),
    };
    adapter.build(BundleAdapterOptions::from(request)).await?;

    let addressed =
        addressed_filename(outfile, &base_name).map_err(|source| MappingError::ContentAddress {
            path: outfile.to_path_buf(),
            source,
        })?;

    replace_file(outfile, &addressed.path).map_err(|source| MappingError::Rename {
        from: outfile.to_path_buf(),
        to: addressed.path.clone(),
        source,
    })?;

    tracing::debug!(key = %mapping.key, hash = %addressed.hash, "bundled shared mapping");

    Ok(SharedInfo::for_mapping(
        mapping,
        addressed.file_name(),
        options.debug,
    ))
}

/// Output path a mapping is bundled to before content addressing.
#[must_use]
pub fn unhashed_outfile(output_dir: &Path, key: &str) -> PathBuf {
    output_dir.join(format!("{}.js", sanitize_key(key)))
}
