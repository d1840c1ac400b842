//! Plugin extension point for the primary bundling step.
//!
//! The primary bundler runs out of process, so plugins cannot take part in
//! module resolution. They see the build twice: `build_start` before the
//! backend runs and `render_output` over the file it wrote, followed by
//! `build_end`. The adapter only sequences hooks.
//!
//! `render_output` sees minified code with an inline source map. Defines and
//! banners go through [`crate::adapter::CodegenOptions`], which the bundler
//! applies itself.
//!
//! ```ignore
//! use fedshare_core::plugin::{BundleOutput, HookResult, Plugin, PluginContext};
//!
//! struct License;
//!
//! impl Plugin for License {
//!     fn name(&self) -> &str { "license" }
//!
//!     fn render_output(&self, code: &str, _out: &BundleOutput, _ctx: &PluginContext) -> HookResult<Option<String>> {
//!         Ok(Some(format!("/*! MIT */\n{code}")))
//!     }
//! }
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub type HookResult<T> = Result<T, PluginError>;

/// A hook failed. Fails the build it ran in.
#[derive(Error, Debug)]
#[error("plugin `{plugin}` failed in {hook}: {message}")]
pub struct PluginError {
    pub plugin: String,
    pub hook: &'static str,
    pub message: String,
}

impl PluginError {
    pub fn new(plugin: impl Into<String>, hook: &'static str, message: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            hook,
            message: message.into(),
        }
    }
}

/// Shared by every hook of one build.
#[derive(Debug, Default, Clone)]
pub struct PluginContext {
    /// Workspace root.
    pub cwd: PathBuf,
}

/// The file a backend produced.
#[derive(Debug, Clone)]
pub struct BundleOutput {
    /// What the backend compiled; the scratch file for package entries.
    pub entry_point: PathBuf,
    pub outfile: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum PluginEnforce {
    Pre,
    #[default]
    Normal,
    Post,
}

/// A build plugin. Every hook is optional.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    fn enforce(&self) -> PluginEnforce {
        PluginEnforce::Normal
    }

    fn build_start(&self, _ctx: &PluginContext) -> HookResult<()> {
        Ok(())
    }

    /// `Some(code)` replaces the written bundle; `None` leaves it as is.
    fn render_output(
        &self,
        _code: &str,
        _output: &BundleOutput,
        _ctx: &PluginContext,
    ) -> HookResult<Option<String>> {
        Ok(None)
    }

    fn build_end(&self, _ctx: &PluginContext) -> HookResult<()> {
        Ok(())
    }
}

/// Plugins of one build in execution order: `Pre`, `Normal`, then `Post`,
/// each level in the order plugins were added.
#[derive(Clone, Default)]
pub struct PluginContainer {
    plugins: Vec<Arc<dyn Plugin>>,
    ctx: PluginContext,
}

impl std::fmt::Debug for PluginContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl PluginContainer {
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            plugins: Vec::new(),
            ctx: PluginContext { cwd },
        }
    }

    pub fn add(&mut self, plugin: Arc<dyn Plugin>) {
        let enforce = plugin.enforce();
        let at = self.plugins.partition_point(|p| p.enforce() <= enforce);
        self.plugins.insert(at, plugin);
    }

    pub fn extend(&mut self, plugins: impl IntoIterator<Item = Arc<dyn Plugin>>) {
        plugins.into_iter().for_each(|p| self.add(p));
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn has_plugins(&self) -> bool {
        !self.plugins.is_empty()
    }

    pub fn build_start(&self) -> HookResult<()> {
        self.plugins.iter().try_for_each(|p| p.build_start(&self.ctx))
    }

    /// Thread `code` through every plugin's `render_output`.
    pub fn render_output(&self, code: &str, output: &BundleOutput) -> HookResult<String> {
        self.plugins
            .iter()
            .try_fold(code.to_string(), |code, p| -> HookResult<String> {
                Ok(p.render_output(&code, output, &self.ctx)?.unwrap_or(code))
            })
    }

    pub fn build_end(&self) -> HookResult<()> {
        self.plugins.iter().try_for_each(|p| p.build_end(&self.ctx))
    }
}
