//! `fedshare tsconfig` command implementation.
//!
//! Shows which tsconfig a shared mapping at the given path would compile with.

use fedshare_core::tsconfig::find_tsconfig;
use fedshare_core::version::SCHEMA_VERSION;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct TsconfigJson {
    ok: bool,
    schema_version: u32,
    start: String,
    tsconfig: Option<String>,
}

/// Run the tsconfig command. Finding nothing is not an error.
pub fn run(cwd: &Path, path: &Path, json: bool) -> Result<()> {
    let start = cwd.join(path);
    let start = dunce::canonicalize(&start).unwrap_or(start);
    let found = find_tsconfig(&start);

    if json {
        let out = TsconfigJson {
            ok: true,
            schema_version: SCHEMA_VERSION,
            start: start.display().to_string(),
            tsconfig: found.as_ref().map(|p| p.display().to_string()),
        };
        println!("{}", serde_json::to_string(&out).into_diagnostic()?);
        return Ok(());
    }

    match found {
        Some(tsconfig) => println!("{}", tsconfig.display()),
        None => println!("no tsconfig found above {}", start.display()),
    }
    Ok(())
}
