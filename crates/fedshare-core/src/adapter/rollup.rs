//! Rollup package normalizer.
//!
//! Packages under `node_modules` are often CommonJS or spread across many
//! files. Rollup flattens one into a single ESM file the primary bundler can
//! consume. The config is generated next to the output in the run's scratch
//! directory and disappears with it.

use super::backend::PackageNormalizer;
use super::tool::{locate_tool, run_tool};
use crate::error::BackendError;
use async_trait::async_trait;
use indexmap::IndexSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Name of the generated config inside the scratch directory.
pub const CONFIG_FILE_NAME: &str = "rollup.config.mjs";

/// Value substituted for `process.env.NODE_ENV`.
pub const NODE_ENV: &str = "development";

const CONFIG_TEMPLATE: &str = r"import commonjs from '@rollup/plugin-commonjs';
import resolve from '@rollup/plugin-node-resolve';
import replace from '@rollup/plugin-replace';

const external = __EXTERNAL__;

export default {
  input: __INPUT__,
  external: (id) => external.some((name) => id === name || id.startsWith(name + '/')),
  plugins: [
    commonjs(),
    resolve(),
    replace({
      preventAssignment: true,
      values: { 'process.env.NODE_ENV': __NODE_ENV__ },
    }),
  ],
  output: {
    file: __OUTPUT__,
    format: 'esm',
    sourcemap: true,
    exports: 'named',
  },
};
";

/// Normalizes packages with the `rollup` executable.
#[derive(Debug, Clone)]
pub struct RollupNormalizer {
    cwd: PathBuf,
    program: Option<PathBuf>,
}

impl RollupNormalizer {
    const TOOL: &'static str = "rollup";

    pub fn new(cwd: PathBuf) -> Self {
        Self { cwd, program: None }
    }

    /// Use a specific rollup executable.
    pub fn with_program(mut self, program: PathBuf) -> Self {
        self.program = Some(program);
        self
    }
}

/// Render the rollup config for one package.
///
/// Every interpolated value is a JSON literal, which is also valid JS.
pub fn render_config(
    entry_point: &Path,
    external: &IndexSet<String>,
    outfile: &Path,
) -> Result<String, serde_json::Error> {
    let input = serde_json::to_string(&entry_point.to_string_lossy())?;
    let output = serde_json::to_string(&outfile.to_string_lossy())?;
    let external = serde_json::to_string(external)?;
    let node_env = serde_json::to_string(&serde_json::to_string(NODE_ENV)?)?;

    Ok(CONFIG_TEMPLATE
        .replace("__EXTERNAL__", &external)
        .replace("__INPUT__", &input)
        .replace("__OUTPUT__", &output)
        .replace("__NODE_ENV__", &node_env))
}

#[async_trait]
impl PackageNormalizer for RollupNormalizer {
    fn name(&self) -> &'static str {
        Self::TOOL
    }

    async fn normalize(
        &self,
        entry_point: &Path,
        external: &IndexSet<String>,
        outfile: &Path,
    ) -> Result<(), BackendError> {
        let config_dir = outfile.parent().unwrap_or(&self.cwd);
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        let config = render_config(entry_point, external, outfile).map_err(|e| {
            BackendError::io(
                &config_path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })?;
        tokio::fs::write(&config_path, config)
            .await
            .map_err(|source| BackendError::io(&config_path, source))?;

        let program = match &self.program {
            Some(program) => program.clone(),
            None => locate_tool(Self::TOOL, &self.cwd)?,
        };
        let args: Vec<OsString> = vec![
            "--config".into(),
            config_path.into_os_string(),
            "--silent".into(),
        ];
        run_tool(Self::TOOL, &program, &args, &self.cwd).await
    }
}
