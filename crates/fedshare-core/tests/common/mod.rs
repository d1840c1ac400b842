//! In-process bundler fakes shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use fedshare_core::adapter::backend::{render_output, BundlerBackend, CompileRequest, PackageNormalizer};
use fedshare_core::adapter::BuildAdapter;
use fedshare_core::error::BackendError;
use indexmap::IndexSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// One call to [`CopyBackend::compile`].
#[derive(Debug, Clone)]
pub struct Compiled {
    pub entry_point: PathBuf,
    pub entry_existed: bool,
    pub external: Vec<String>,
    pub outfile: PathBuf,
    pub ts_config: Option<PathBuf>,
    pub defines: Vec<(String, String)>,
    pub banner: Option<String>,
}

/// "Bundles" by copying the entry point behind a fixed header.
#[derive(Debug, Default)]
pub struct CopyBackend {
    pub compiled: Mutex<Vec<Compiled>>,
    pub fail: bool,
}

impl CopyBackend {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Compiled> {
        self.compiled.lock().unwrap().clone()
    }
}

#[async_trait]
impl BundlerBackend for CopyBackend {
    fn name(&self) -> &'static str {
        "copy"
    }

    async fn compile(&self, request: &CompileRequest<'_>) -> Result<(), BackendError> {
        request.plugins.build_start()?;

        self.compiled.lock().unwrap().push(Compiled {
            entry_point: request.entry_point.to_path_buf(),
            entry_existed: request.entry_point.exists(),
            external: request.external.iter().cloned().collect(),
            outfile: request.outfile.to_path_buf(),
            ts_config: request.ts_config.map(Path::to_path_buf),
            defines: request
                .codegen
                .defines()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            banner: request.codegen.banner_text().map(String::from),
        });

        if self.fail {
            return Err(BackendError::Exit {
                tool: "copy",
                status: "exit status: 1".into(),
                stderr: "Could not resolve \"./missing\"".into(),
            });
        }

        let source = fs::read_to_string(request.entry_point).map_err(|source| BackendError::Io {
            path: request.entry_point.to_path_buf(),
            source,
        })?;
        fs::write(request.outfile, format!("// bundled\n{source}")).map_err(|source| {
            BackendError::Io {
                path: request.outfile.to_path_buf(),
                source,
            }
        })?;

        if request.plugins.has_plugins() {
            render_output(request).await?;
        }

        request.plugins.build_end()?;
        Ok(())
    }
}

/// One call to [`RecordingNormalizer::normalize`].
#[derive(Debug, Clone)]
pub struct Normalized {
    pub entry_point: PathBuf,
    pub external: Vec<String>,
    pub outfile: PathBuf,
}

/// Records calls and writes a fixed ESM module to the scratch file.
#[derive(Debug, Default)]
pub struct RecordingNormalizer {
    pub normalized: Mutex<Vec<Normalized>>,
    pub fail: bool,
}

impl RecordingNormalizer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Normalized> {
        self.normalized.lock().unwrap().clone()
    }
}

#[async_trait]
impl PackageNormalizer for RecordingNormalizer {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn normalize(
        &self,
        entry_point: &Path,
        external: &IndexSet<String>,
        outfile: &Path,
    ) -> Result<(), BackendError> {
        self.normalized.lock().unwrap().push(Normalized {
            entry_point: entry_point.to_path_buf(),
            external: external.iter().cloned().collect(),
            outfile: outfile.to_path_buf(),
        });

        // Partial output, as a crashing tool would leave behind
        fs::write(outfile, "export const partial").map_err(|source| BackendError::Io {
            path: outfile.to_path_buf(),
            source,
        })?;

        if self.fail {
            return Err(BackendError::Exit {
                tool: "recording",
                status: "exit status: 1".into(),
                stderr: "[!] Error: Could not resolve './nested'".into(),
            });
        }

        fs::write(outfile, "export default 'normalized';").map_err(|source| BackendError::Io {
            path: outfile.to_path_buf(),
            source,
        })
    }
}

/// An adapter over the given fakes, rooted at `root`.
pub fn adapter(
    root: &Path,
    backend: &Arc<CopyBackend>,
    normalizer: &Arc<RecordingNormalizer>,
) -> BuildAdapter {
    BuildAdapter::new(backend.clone(), normalizer.clone(), root.to_path_buf())
}

/// Write `contents` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

/// Entries of a directory, or none if it does not exist.
pub fn dir_entries(dir: &Path) -> Vec<PathBuf> {
    match fs::read_dir(dir) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

pub fn externals(names: &[&str]) -> IndexSet<String> {
    names.iter().map(|n| (*n).to_string()).collect()
}
