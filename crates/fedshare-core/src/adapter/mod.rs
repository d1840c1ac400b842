//! Build adapter: turns one entry point into one externally loadable ESM file.
//!
//! ## Routing
//!
//! - **Local entry** (`src/app/shared.ts`) - compiled directly.
//! - **Package entry** (anything under `node_modules`) - first flattened by
//!   the [`PackageNormalizer`] into a scratch file, then the scratch file is
//!   compiled instead of the original.
//!
//! Packages are often CommonJS or mixed-format, and a single primary-bundler
//! run cannot both respect the external set and normalize the module format,
//! hence the separate pre-pass.

pub mod backend;
mod esbuild;
mod rollup;
mod scratch;
pub mod tool;

pub use backend::{BundlerBackend, CodegenOptions, CompileRequest, PackageNormalizer};
pub use esbuild::EsbuildBackend;
pub use rollup::RollupNormalizer;
pub use scratch::ScratchEntry;

use crate::config::DEPENDENCY_DIR;
use crate::error::{BackendError, MappingError};
use crate::federation::SharedMapping;
use crate::plugin::{Plugin, PluginContainer};
use indexmap::IndexSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One bundling operation. Built fresh per mapping.
#[derive(Debug, Clone)]
pub struct BundleRequest {
    pub entry_point: PathBuf,
    pub ts_config_path: Option<PathBuf>,
    pub external: IndexSet<String>,
    pub outfile: PathBuf,
    pub mapped_paths: Vec<SharedMapping>,
}

/// A [`BundleRequest`] plus plugins for this build only.
#[derive(Clone)]
pub struct BundleAdapterOptions {
    pub request: BundleRequest,
    pub plugins: Vec<Arc<dyn Plugin>>,
}

impl std::fmt::Debug for BundleAdapterOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleAdapterOptions")
            .field("request", &self.request)
            .field(
                "plugins",
                &self.plugins.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl From<BundleRequest> for BundleAdapterOptions {
    fn from(request: BundleRequest) -> Self {
        Self {
            request,
            plugins: Vec::new(),
        }
    }
}

impl BundleAdapterOptions {
    /// Add a plugin for this build.
    pub fn plugin(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.push(plugin);
        self
    }
}

/// Whether an entry point lives inside the dependency tree.
#[must_use]
pub fn is_package_entry(entry_point: &Path) -> bool {
    entry_point.to_string_lossy().contains(DEPENDENCY_DIR)
}

/// Scratch-file name for a package entry point.
///
/// Everything up to and including the last `node_modules` is dropped, then
/// every character other than `[A-Za-z0-9.]` becomes `_`.
#[must_use]
pub fn infer_package_name(entry_point: &Path) -> String {
    let entry = entry_point.to_string_lossy();
    let rest = match entry.rfind(DEPENDENCY_DIR) {
        Some(idx) => &entry[idx + DEPENDENCY_DIR.len()..],
        None => &entry[..],
    };

    rest.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// The orchestrating build capability.
pub struct BuildAdapter {
    backend: Arc<dyn BundlerBackend>,
    normalizer: Arc<dyn PackageNormalizer>,
    cwd: PathBuf,
    scratch_root: PathBuf,
    codegen: CodegenOptions,
    plugins: Vec<Arc<dyn Plugin>>,
}

impl BuildAdapter {
    /// Create an adapter over the given engines.
    ///
    /// Scratch files go to `<cwd>/node_modules/.tmp`.
    pub fn new(
        backend: Arc<dyn BundlerBackend>,
        normalizer: Arc<dyn PackageNormalizer>,
        cwd: PathBuf,
    ) -> Self {
        let scratch_root = cwd.join(DEPENDENCY_DIR).join(".tmp");
        Self {
            backend,
            normalizer,
            cwd,
            scratch_root,
            codegen: CodegenOptions::default(),
            plugins: Vec::new(),
        }
    }

    /// esbuild for compiling, rollup for package normalization.
    pub fn esbuild(cwd: PathBuf) -> Self {
        Self::new(
            Arc::new(EsbuildBackend::new(cwd.clone())),
            Arc::new(RollupNormalizer::new(cwd.clone())),
            cwd,
        )
    }

    /// Override the scratch directory.
    pub fn with_scratch_root(mut self, scratch_root: PathBuf) -> Self {
        self.scratch_root = scratch_root;
        self
    }

    /// Defines, banner and footer for every compile.
    pub fn with_codegen(mut self, codegen: CodegenOptions) -> Self {
        self.codegen = codegen;
        self
    }

    /// Plugins applied to every build, ahead of per-build plugins.
    pub fn with_plugins(mut self, plugins: Vec<Arc<dyn Plugin>>) -> Self {
        self.plugins = plugins;
        self
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn normalizer_name(&self) -> &'static str {
        self.normalizer.name()
    }

    pub fn scratch_root(&self) -> &Path {
        &self.scratch_root
    }

    /// Build `options.request.outfile`.
    ///
    /// Package entries are normalized into a scratch file first; the scratch
    /// directory is removed before this returns, on success and failure.
    pub async fn build(&self, options: BundleAdapterOptions) -> Result<(), MappingError> {
        let BundleAdapterOptions { request, plugins } = options;

        let mut container = PluginContainer::new(self.cwd.clone());
        container.extend(self.plugins.iter().cloned());
        container.extend(plugins);

        let scratch = if is_package_entry(&request.entry_point) {
            Some(self.normalize(&request).await?)
        } else {
            tracing::debug!(
                entry = %request.entry_point.display(),
                "local entry point, compiling directly"
            );
            None
        };

        let entry_point = scratch
            .as_ref()
            .map_or(request.entry_point.as_path(), ScratchEntry::path);

        let compile = CompileRequest {
            entry_point,
            external: &request.external,
            outfile: &request.outfile,
            ts_config: request.ts_config_path.as_deref(),
            mapped_paths: &request.mapped_paths,
            codegen: &self.codegen,
            plugins: &container,
        };

        let result = self.backend.compile(&compile).await;
        drop(scratch);

        result.map_err(|source| MappingError::Bundle {
            entry: request.entry_point,
            source,
        })
    }

    async fn normalize(&self, request: &BundleRequest) -> Result<ScratchEntry, MappingError> {
        let entry = &request.entry_point;
        let package_name = infer_package_name(entry);

        let scratch = ScratchEntry::create(&self.scratch_root, &package_name).map_err(|source| {
            MappingError::Normalize {
                entry: entry.clone(),
                source: BackendError::io(&self.scratch_root, source),
            }
        })?;

        tracing::debug!(
            entry = %entry.display(),
            scratch = %scratch.path().display(),
            normalizer = self.normalizer.name(),
            "package entry point, normalizing first"
        );

        self.normalizer
            .normalize(entry, &request.external, scratch.path())
            .await
            .map_err(|source| MappingError::Normalize {
                entry: entry.clone(),
                source,
            })?;

        Ok(scratch)
    }
}
