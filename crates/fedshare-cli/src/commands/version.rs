use fedshare_core::version::{version_string, SCHEMA_VERSION, VERSION};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

#[derive(Serialize)]
struct VersionJson {
    ok: bool,
    schema_version: u32,
    version: &'static str,
}

pub fn run(json: bool) -> Result<()> {
    if json {
        let out = VersionJson {
            ok: true,
            schema_version: SCHEMA_VERSION,
            version: VERSION,
        };
        println!("{}", serde_json::to_string(&out).into_diagnostic()?);
    } else {
        println!("{}", version_string());
    }
    Ok(())
}
