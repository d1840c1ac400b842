//! esbuild CLI backend.

use super::backend::{render_output, BundlerBackend, CompileRequest};
use super::tool::{locate_tool, run_tool};
use crate::error::BackendError;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;

/// Compiles with the `esbuild` executable.
///
/// Defines, banner and footer become esbuild flags. Plugins run in-process
/// around the esbuild call: `build_start` before, `render_output` over the
/// written file, then `build_end`.
#[derive(Debug, Clone)]
pub struct EsbuildBackend {
    cwd: PathBuf,
    program: Option<PathBuf>,
}

impl EsbuildBackend {
    const TOOL: &'static str = "esbuild";

    /// Create a backend that looks esbuild up from `cwd`.
    pub fn new(cwd: PathBuf) -> Self {
        Self { cwd, program: None }
    }

    /// Use a specific esbuild executable.
    pub fn with_program(mut self, program: PathBuf) -> Self {
        self.program = Some(program);
        self
    }

    fn args(request: &CompileRequest<'_>) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            request.entry_point.as_os_str().to_owned(),
            "--bundle".into(),
            "--format=esm".into(),
            "--target=esnext".into(),
            "--minify".into(),
            "--sourcemap=inline".into(),
            "--log-level=warning".into(),
        ];

        let mut outfile = OsString::from("--outfile=");
        outfile.push(request.outfile);
        args.push(outfile);

        for name in request.external {
            args.push(format!("--external:{name}").into());
        }

        if let Some(ts_config) = request.ts_config {
            let mut arg = OsString::from("--tsconfig=");
            arg.push(ts_config);
            args.push(arg);
        }

        for mapping in request.mapped_paths {
            if request.external.contains(&mapping.key) {
                continue;
            }
            let mut arg = OsString::from(format!("--alias:{}=", mapping.key));
            arg.push(&mapping.path);
            args.push(arg);
        }

        for (key, value) in request.codegen.defines() {
            args.push(format!("--define:{key}={value}").into());
        }
        if let Some(banner) = request.codegen.banner_text() {
            args.push(format!("--banner:js={banner}").into());
        }
        if let Some(footer) = request.codegen.footer_text() {
            args.push(format!("--footer:js={footer}").into());
        }

        args
    }
}

#[async_trait]
impl BundlerBackend for EsbuildBackend {
    fn name(&self) -> &'static str {
        Self::TOOL
    }

    async fn compile(&self, request: &CompileRequest<'_>) -> Result<(), BackendError> {
        request.plugins.build_start()?;

        let program = match &self.program {
            Some(program) => program.clone(),
            None => locate_tool(Self::TOOL, &self.cwd)?,
        };
        run_tool(Self::TOOL, &program, &Self::args(request), &self.cwd).await?;

        if request.plugins.has_plugins() {
            render_output(request).await?;
        }

        request.plugins.build_end()?;
        Ok(())
    }
}
