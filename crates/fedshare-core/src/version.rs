use std::fmt::Write;

/// The current version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Schema version of the JSON emitted by the CLI.
/// Bump this when changing the shape of `SharedInfo` or the command output.
pub const SCHEMA_VERSION: u32 = 1;

/// Returns a formatted version string including build metadata if available.
#[must_use]
pub fn version_string() -> String {
    let mut s = format!("fedshare {VERSION}");

    if let Some(hash) = option_env!("FEDSHARE_BUILD_GIT_HASH") {
        let _ = write!(s, " ({hash})");
    }

    s
}
