use crate::codes;
use crate::plugin::PluginError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type: configuration loading and batch setup.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigRead { .. } => codes::CONFIG_READ_FAILED,
            Self::ConfigParse { .. } => codes::CONFIG_PARSE_FAILED,
            Self::OutputDir { .. } => codes::OUTPUT_DIR_FAILED,
        }
    }
}

/// Failure of a single external bundler invocation.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("`{tool}` not found in node_modules/.bin or PATH")]
    ToolNotFound { tool: &'static str },

    #[error("failed to spawn `{tool}`: {source}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("`{tool}` failed ({status}): {stderr}")]
    Exit {
        tool: &'static str,
        status: String,
        stderr: String,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Plugin(#[from] PluginError),
}

impl BackendError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ToolNotFound { .. } => codes::BACKEND_TOOL_NOT_FOUND,
            Self::Spawn { .. } => codes::BACKEND_SPAWN_FAILED,
            Self::Exit { .. } => codes::BACKEND_EXIT_FAILURE,
            Self::Io { .. } => codes::BACKEND_IO_ERROR,
            Self::Plugin(_) => codes::BACKEND_PLUGIN_ERROR,
        }
    }
}

/// Why a shared mapping was skipped.
///
/// Every variant is fatal to its mapping only; the driver logs it and moves on.
#[derive(Error, Debug)]
pub enum MappingError {
    #[error("normalizing package entry {entry} failed: {source}")]
    Normalize {
        entry: PathBuf,
        #[source]
        source: BackendError,
    },

    #[error("bundling {entry} failed: {source}")]
    Bundle {
        entry: PathBuf,
        #[source]
        source: BackendError,
    },

    #[error("bundle output {path} missing or unreadable: {source}")]
    ContentAddress {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to move {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl MappingError {
    /// Stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Normalize { .. } => codes::SHARED_NORMALIZE_FAILED,
            Self::Bundle { .. } => codes::SHARED_BUNDLE_FAILED,
            Self::ContentAddress { .. } => codes::SHARED_CONTENT_ADDRESS_FAILED,
            Self::Rename { .. } => codes::SHARED_RENAME_FAILED,
        }
    }

    /// Code of the underlying backend failure, if any.
    #[must_use]
    pub fn backend_code(&self) -> Option<&'static str> {
        match self {
            Self::Normalize { source, .. } | Self::Bundle { source, .. } => Some(source.code()),
            Self::ContentAddress { .. } | Self::Rename { .. } => None,
        }
    }
}
