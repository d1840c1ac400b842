//! `fedshare bundle-shared` command implementation.
//!
//! Loads the federation config, bundles every shared mapping with the
//! esbuild/rollup backends and reports one line (or one JSON entry) per
//! mapping. A failing mapping does not fail the command; a broken config does.

use fedshare_core::shared::bundle_shared_mappings_detailed;
use fedshare_core::version::SCHEMA_VERSION;
use fedshare_core::{federation, BuildAdapter, CodegenOptions, FederationOptions, SharedInfo};
use indexmap::IndexSet;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Bundle-shared command action.
#[derive(Debug, Clone)]
pub struct BundleSharedAction {
    /// Workspace root.
    pub cwd: PathBuf,
    /// Explicit federation config file.
    pub config: Option<PathBuf>,
    /// Output directory for hashed bundles.
    pub output: PathBuf,
    /// Fallback tsconfig.
    pub tsconfig: PathBuf,
    /// Extra externals on top of the config file's.
    pub external: Vec<String>,
    /// Attach source entry points to records.
    pub debug: bool,
    /// Write the records to this file.
    pub manifest: Option<PathBuf>,
    /// Define replacements (e.g., __DEV__=false).
    pub define: Vec<String>,
    /// Banner text to prepend.
    pub banner: Option<String>,
    /// Footer text to append.
    pub footer: Option<String>,
}

#[derive(Serialize)]
struct BundleSharedJson {
    ok: bool,
    schema_version: u32,
    shared: Vec<SharedInfo>,
    failures: Vec<FailureJson>,
    duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorJson>,
}

#[derive(Serialize)]
struct FailureJson {
    key: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    backend_code: Option<&'static str>,
    message: String,
}

#[derive(Serialize)]
struct ErrorJson {
    code: &'static str,
    message: String,
}

/// Codegen settings from `--define`, `--banner` and `--footer`.
pub fn codegen_from_flags(
    define: &[String],
    banner: Option<&str>,
    footer: Option<&str>,
) -> CodegenOptions {
    let mut codegen = CodegenOptions::new();

    for def in define {
        if let Some((key, value)) = def.split_once('=') {
            codegen = codegen.define(key.trim(), value.trim());
        } else {
            tracing::warn!(define = %def, "ignoring --define without '='");
        }
    }
    if let Some(banner) = banner {
        codegen = codegen.banner(banner);
    }
    if let Some(footer) = footer {
        codegen = codegen.footer(footer);
    }

    codegen
}

/// Run the bundle-shared command.
pub async fn run(action: BundleSharedAction, json: bool) -> Result<()> {
    let start = Instant::now();

    let options = FederationOptions::new(action.cwd.clone())
        .with_output_path(&action.output)
        .with_tsconfig(&action.tsconfig)
        .with_debug(action.debug);

    let config = match federation::load_config(
        &action.cwd,
        action.config.as_deref(),
        &options.default_tsconfig(),
    ) {
        Ok(config) => config,
        Err(e) => return fail(e.code(), e.to_string(), start, json),
    };

    let mut externals: IndexSet<String> = config.externals.clone();
    externals.extend(action.external.iter().cloned());

    let adapter = BuildAdapter::esbuild(action.cwd.clone())
        .with_scratch_root(options.scratch_root())
        .with_codegen(codegen_from_flags(
            &action.define,
            action.banner.as_deref(),
            action.footer.as_deref(),
        ));

    tracing::debug!(
        mappings = config.shared_mappings.len(),
        externals = externals.len(),
        backend = adapter.backend_name(),
        normalizer = adapter.normalizer_name(),
        "bundling shared mappings"
    );

    let outcomes = match bundle_shared_mappings_detailed(&config, &options, &externals, &adapter).await
    {
        Ok(outcomes) => outcomes,
        Err(e) => return fail(e.code(), e.to_string(), start, json),
    };

    let total = outcomes.len();
    let mut shared = Vec::with_capacity(total);
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome.result {
            Ok(info) => shared.push(info),
            Err(e) => failures.push(FailureJson {
                key: outcome.key,
                code: e.code(),
                backend_code: e.backend_code(),
                message: e.to_string(),
            }),
        }
    }

    if let Some(manifest) = &action.manifest {
        write_manifest(&action.cwd.join(manifest), &shared)?;
    }

    let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    if json {
        let out = BundleSharedJson {
            ok: true,
            schema_version: SCHEMA_VERSION,
            shared,
            failures,
            duration_ms,
            error: None,
        };
        println!("{}", serde_json::to_string(&out).into_diagnostic()?);
        return Ok(());
    }

    let output_dir = options.output_dir();
    for info in &shared {
        println!(
            "  {} -> {}",
            info.package_name,
            output_dir.join(&info.out_file_name).display()
        );
    }
    for failure in &failures {
        println!("  {} skipped ({})", failure.key, failure.code);
    }
    println!(
        "Bundled {} of {} shared mappings ({}ms)",
        shared.len(),
        total,
        duration_ms
    );

    Ok(())
}

fn write_manifest(path: &Path, shared: &[SharedInfo]) -> Result<()> {
    let mut bytes = serde_json::to_vec_pretty(shared).into_diagnostic()?;
    bytes.push(b'\n');

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).into_diagnostic()?;
    }
    fedshare_util::fs::atomic_write(path, &bytes).into_diagnostic()?;

    tracing::debug!(path = %path.display(), entries = shared.len(), "wrote manifest");
    Ok(())
}

fn fail(code: &'static str, message: String, start: Instant, json: bool) -> Result<()> {
    if json {
        let out = BundleSharedJson {
            ok: false,
            schema_version: SCHEMA_VERSION,
            shared: Vec::new(),
            failures: Vec::new(),
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            error: Some(ErrorJson { code, message }),
        };
        println!("{}", serde_json::to_string(&out).into_diagnostic()?);
    } else {
        eprintln!("error: {message}");
    }
    std::process::exit(1);
}
