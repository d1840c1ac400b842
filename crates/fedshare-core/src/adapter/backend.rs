//! Bundler backend abstraction.
//!
//! The adapter never calls a bundler directly. It talks to two capabilities:
//!
//! - [`BundlerBackend`] - "compile entry point X with external set E into ESM file F"
//! - [`PackageNormalizer`] - "flatten package P into one ESM file, keeping E external"
//!
//! One concrete implementation exists per engine ([`super::EsbuildBackend`],
//! [`super::RollupNormalizer`]); tests substitute their own.

use crate::error::BackendError;
use crate::federation::SharedMapping;
use crate::plugin::{BundleOutput, PluginContainer};
use async_trait::async_trait;
use indexmap::{IndexMap, IndexSet};
use std::path::Path;

/// Source-level settings the primary bundler applies while compiling.
///
/// Defines are substituted on the parsed program, so only whole expressions
/// match and dead branches are dropped. Banner and footer are emitted by the
/// bundler itself, keeping the inline source map aligned.
#[derive(Debug, Clone, Default)]
pub struct CodegenOptions {
    define: IndexMap<String, String>,
    banner: Option<String>,
    footer: Option<String>,
}

impl CodegenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the global expression `key` with the JS expression `value`.
    pub fn define(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.define.insert(key.into(), value.into());
        self
    }

    /// `process.env.<name>` as a string literal.
    pub fn env(self, name: &str, value: &str) -> Self {
        self.define(format!("process.env.{name}"), format!("{value:?}"))
    }

    pub fn banner(mut self, text: impl Into<String>) -> Self {
        self.banner = Some(text.into());
        self
    }

    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(text.into());
        self
    }

    pub fn defines(&self) -> impl Iterator<Item = (&str, &str)> {
        self.define.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn banner_text(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn footer_text(&self) -> Option<&str> {
        self.footer.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.define.is_empty() && self.banner.is_none() && self.footer.is_none()
    }
}

/// Everything the primary bundler needs for one compile.
///
/// The contract is fixed: bundle all non-external dependencies, minify,
/// inline source maps, latest module syntax, ESM output.
#[derive(Debug)]
pub struct CompileRequest<'a> {
    /// File to compile.
    pub entry_point: &'a Path,
    /// Module names left as imports.
    pub external: &'a IndexSet<String>,
    /// File to write.
    pub outfile: &'a Path,
    /// Compiler settings, if any were found.
    pub ts_config: Option<&'a Path>,
    /// Extra alias → path mappings.
    pub mapped_paths: &'a [SharedMapping],
    /// Defines, banner and footer.
    pub codegen: &'a CodegenOptions,
    /// Plugins to run around the compile.
    pub plugins: &'a PluginContainer,
}

/// Primary bundler capability.
#[async_trait]
pub trait BundlerBackend: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &'static str;

    /// Compile `request.entry_point` into `request.outfile`.
    async fn compile(&self, request: &CompileRequest<'_>) -> Result<(), BackendError>;
}

/// Secondary bundler used to flatten CommonJS or mixed-format packages.
#[async_trait]
pub trait PackageNormalizer: Send + Sync {
    /// Normalizer name for logs.
    fn name(&self) -> &'static str;

    /// Write a single ESM file for `entry_point` to `outfile`.
    ///
    /// Modules named in `external` (or their subpaths) stay as imports.
    /// `process.env.NODE_ENV` is replaced with `"development"`.
    async fn normalize(
        &self,
        entry_point: &Path,
        external: &IndexSet<String>,
        outfile: &Path,
    ) -> Result<(), BackendError>;
}

/// Run the request's `render_output` chain over the written outfile.
///
/// Leaves the file untouched when no plugin changes it. Plugins see minified
/// code; text edits belong in [`CodegenOptions`] instead.
pub async fn render_output(request: &CompileRequest<'_>) -> Result<(), BackendError> {
    let code = tokio::fs::read_to_string(request.outfile)
        .await
        .map_err(|source| BackendError::io(request.outfile, source))?;

    let output = BundleOutput {
        entry_point: request.entry_point.to_path_buf(),
        outfile: request.outfile.to_path_buf(),
    };
    let rendered = request.plugins.render_output(&code, &output)?;

    if rendered != code {
        tokio::fs::write(request.outfile, rendered)
            .await
            .map_err(|source| BackendError::io(request.outfile, source))?;
    }

    Ok(())
}
