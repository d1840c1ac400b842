//! Stable error codes.
//!
//! All codes are SCREAMING_SNAKE_CASE and stable across versions.

/// Package normalization pass failed.
pub const SHARED_NORMALIZE_FAILED: &str = "SHARED_NORMALIZE_FAILED";

/// Primary bundler failed.
pub const SHARED_BUNDLE_FAILED: &str = "SHARED_BUNDLE_FAILED";

/// Bundle output missing or unreadable when hashing.
pub const SHARED_CONTENT_ADDRESS_FAILED: &str = "SHARED_CONTENT_ADDRESS_FAILED";

/// Renaming the bundle to its hashed name failed.
pub const SHARED_RENAME_FAILED: &str = "SHARED_RENAME_FAILED";

/// Bundler executable not found in node_modules/.bin or PATH.
pub const BACKEND_TOOL_NOT_FOUND: &str = "BACKEND_TOOL_NOT_FOUND";

/// Bundler executable could not be started.
pub const BACKEND_SPAWN_FAILED: &str = "BACKEND_SPAWN_FAILED";

/// Bundler exited with non-zero status.
pub const BACKEND_EXIT_FAILURE: &str = "BACKEND_EXIT_FAILURE";

/// I/O error around scratch files or bundle output.
pub const BACKEND_IO_ERROR: &str = "BACKEND_IO_ERROR";

/// A plugin hook returned an error.
pub const BACKEND_PLUGIN_ERROR: &str = "BACKEND_PLUGIN_ERROR";

/// Federation config or tsconfig could not be read.
pub const CONFIG_READ_FAILED: &str = "CONFIG_READ_FAILED";

/// Federation config or tsconfig could not be parsed.
pub const CONFIG_PARSE_FAILED: &str = "CONFIG_PARSE_FAILED";

/// Output directory could not be created.
pub const OUTPUT_DIR_FAILED: &str = "OUTPUT_DIR_FAILED";
