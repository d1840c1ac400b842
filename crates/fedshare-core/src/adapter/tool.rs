//! Locating and running external bundler executables.

use crate::config::DEPENDENCY_DIR;
use crate::error::BackendError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Lines of stderr kept in an exit error.
const STDERR_TAIL_LINES: usize = 20;

/// Find `tool` in `node_modules/.bin` at or above `root`, then on `PATH`.
pub fn locate_tool(tool: &'static str, root: &Path) -> Result<PathBuf, BackendError> {
    let bin_name = if cfg!(windows) {
        format!("{tool}.cmd")
    } else {
        tool.to_string()
    };

    let mut current = root.to_path_buf();
    loop {
        let candidate = current.join(DEPENDENCY_DIR).join(".bin").join(&bin_name);
        if candidate.is_file() {
            return Ok(candidate);
        }
        if !current.pop() {
            break;
        }
    }

    which::which(tool).map_err(|_| BackendError::ToolNotFound { tool })
}

/// Run a tool to completion. Non-zero exit becomes [`BackendError::Exit`].
pub async fn run_tool(
    tool: &'static str,
    program: &Path,
    args: &[OsString],
    cwd: &Path,
) -> Result<(), BackendError> {
    tracing::debug!(tool, program = %program.display(), ?args, "spawning bundler");

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|source| BackendError::Spawn { tool, source })?;

    if output.status.success() {
        return Ok(());
    }

    Err(BackendError::Exit {
        tool,
        status: output.status.to_string(),
        stderr: stderr_tail(&output.stderr),
    })
}

/// Last [`STDERR_TAIL_LINES`] lines of a process's stderr.
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.trim_end().lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
