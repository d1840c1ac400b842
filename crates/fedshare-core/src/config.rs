use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory name of the package-manager dependency tree.
pub const DEPENDENCY_DIR: &str = "node_modules";

/// Options for one shared-mapping bundling run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederationOptions {
    /// Workspace root. Relative paths below resolve against it.
    pub workspace_root: PathBuf,

    /// Directory the hashed bundles are written to.
    pub output_path: PathBuf,

    /// tsconfig used when no config is found above a mapping.
    pub tsconfig: PathBuf,

    /// Attach the source entry point to each emitted record.
    pub debug: bool,
}

impl Default for FederationOptions {
    fn default() -> Self {
        Self {
            workspace_root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            output_path: PathBuf::from("dist"),
            tsconfig: PathBuf::from("tsconfig.json"),
            debug: false,
        }
    }
}

impl FederationOptions {
    /// Create options rooted at the given workspace directory.
    #[must_use]
    pub fn new(workspace_root: PathBuf) -> Self {
        Self {
            workspace_root,
            ..Default::default()
        }
    }

    /// Set the output directory.
    #[must_use]
    pub fn with_output_path(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = output_path.into();
        self
    }

    /// Set the fallback tsconfig.
    #[must_use]
    pub fn with_tsconfig(mut self, tsconfig: impl Into<PathBuf>) -> Self {
        self.tsconfig = tsconfig.into();
        self
    }

    /// Enable or disable debug records.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Output directory, absolute.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.output_path)
    }

    /// Fallback tsconfig, absolute.
    #[must_use]
    pub fn default_tsconfig(&self) -> PathBuf {
        self.resolve(&self.tsconfig)
    }

    /// Directory holding normalization scratch files.
    #[must_use]
    pub fn scratch_root(&self) -> PathBuf {
        self.workspace_root.join(DEPENDENCY_DIR).join(".tmp")
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        }
    }
}
