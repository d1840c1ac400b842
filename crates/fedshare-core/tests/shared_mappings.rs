//! Shared-mapping driver behavior over in-process fakes.

mod common;

use common::{adapter, dir_entries, externals, write_file, CopyBackend, RecordingNormalizer};
use fedshare_core::codes;
use fedshare_core::{
    bundle_shared_mappings, bundle_shared_mappings_detailed, Error, FederationOptions,
    MappingError, NormalizedFederationConfig, SharedMapping,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;

fn config(mappings: Vec<SharedMapping>) -> NormalizedFederationConfig {
    NormalizedFederationConfig {
        shared_mappings: mappings,
        ..Default::default()
    }
}

fn is_addressed_name(name: &str) -> bool {
    let Some(stem) = name.strip_suffix(".js") else {
        return false;
    };
    let Some((key, hash)) = stem.rsplit_once('-') else {
        return false;
    };
    !key.is_empty()
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !hash.is_empty()
        && hash.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
}

struct Fixture {
    root: tempfile::TempDir,
    backend: Arc<CopyBackend>,
    normalizer: Arc<RecordingNormalizer>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
            backend: Arc::new(CopyBackend::default()),
            normalizer: Arc::new(RecordingNormalizer::default()),
        }
    }

    fn root(&self) -> &Path {
        self.root.path()
    }

    fn options(&self) -> FederationOptions {
        FederationOptions::new(self.root().to_path_buf()).with_output_path("dist")
    }

    async fn run(
        &self,
        config: &NormalizedFederationConfig,
        options: &FederationOptions,
    ) -> Vec<fedshare_core::SharedInfo> {
        let adapter = adapter(self.root(), &self.backend, &self.normalizer);
        bundle_shared_mappings(config, options, &externals(&["react"]), &adapter)
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn test_every_valid_mapping_is_bundled() {
    let fx = Fixture::new();
    let auth = write_file(fx.root(), "libs/auth/index.ts", "export const auth = 1;");
    let ui = write_file(fx.root(), "libs/ui/index.ts", "export const ui = 2;");
    let config = config(vec![
        SharedMapping::new("@demo/auth", auth),
        SharedMapping::new("@demo/ui-kit", ui),
    ]);

    let shared = fx.run(&config, &fx.options()).await;

    assert_eq!(shared.len(), 2);
    assert_eq!(shared[0].package_name, "@demo/auth");
    assert_eq!(shared[1].package_name, "@demo/ui-kit");
    assert!(shared[0].out_file_name.starts_with("_demo_auth-"));
    assert!(shared[1].out_file_name.starts_with("_demo_ui_kit-"));

    let dist = fx.root().join("dist");
    for info in &shared {
        assert!(is_addressed_name(&info.out_file_name), "{}", info.out_file_name);
        assert!(info.singleton);
        assert!(!info.strict_version);
        assert!(info.version.is_empty());
        assert!(info.required_version.is_empty());
        assert!(dist.join(&info.out_file_name).is_file());
    }

    // Only hashed names remain
    assert_eq!(dir_entries(&dist).len(), 2);
    assert!(!dist.join("_demo_auth.js").exists());

    let compiled = fx.backend.calls();
    assert!(compiled.iter().all(|c| c.external == vec!["react".to_string()]));
}

#[tokio::test]
async fn test_unchanged_source_keeps_its_name() {
    let fx = Fixture::new();
    let auth = write_file(fx.root(), "libs/auth/index.ts", "export const auth = 1;");
    let config = config(vec![SharedMapping::new("@demo/auth", auth)]);

    let first = fx.run(&config, &fx.options()).await;
    let second = fx.run(&config, &fx.options()).await;

    assert_eq!(first, second);
    assert_eq!(dir_entries(&fx.root().join("dist")).len(), 1);
}

#[tokio::test]
async fn test_changed_source_gets_a_new_name() {
    let fx = Fixture::new();
    let auth = write_file(fx.root(), "libs/auth/index.ts", "export const auth = 1;");
    let config = config(vec![SharedMapping::new("@demo/auth", auth.clone())]);

    let before = fx.run(&config, &fx.options()).await;
    fs::write(&auth, "export const auth = 2;").unwrap();
    let after = fx.run(&config, &fx.options()).await;

    assert_ne!(before[0].out_file_name, after[0].out_file_name);
}

#[tokio::test]
async fn test_failing_mapping_is_isolated() {
    let fx = Fixture::new();
    let auth = write_file(fx.root(), "libs/auth/index.ts", "export const auth = 1;");
    let ui = write_file(fx.root(), "libs/ui/index.ts", "export const ui = 2;");
    let config = config(vec![
        SharedMapping::new("@demo/auth", auth),
        SharedMapping::new("@demo/missing", fx.root().join("libs/missing/index.ts")),
        SharedMapping::new("@demo/ui", ui),
    ]);
    let adapter = adapter(fx.root(), &fx.backend, &fx.normalizer);

    let outcomes = bundle_shared_mappings_detailed(&config, &fx.options(), &externals(&[]), &adapter)
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].is_ok());
    assert!(outcomes[2].is_ok());
    assert_eq!(outcomes[1].key, "@demo/missing");
    match &outcomes[1].result {
        Err(err @ MappingError::Bundle { .. }) => {
            assert_eq!(err.code(), codes::SHARED_BUNDLE_FAILED);
            assert_eq!(err.backend_code(), Some(codes::BACKEND_IO_ERROR));
        }
        other => panic!("expected Bundle error, got {other:?}"),
    }

    let shared = fx.run(&config, &fx.options()).await;
    let keys: Vec<_> = shared.iter().map(|s| s.package_name.as_str()).collect();
    assert_eq!(keys, ["@demo/auth", "@demo/ui"]);
}

#[tokio::test]
async fn test_missing_output_is_content_address_failure() {
    struct NoOutput;

    #[async_trait::async_trait]
    impl fedshare_core::adapter::BundlerBackend for NoOutput {
        fn name(&self) -> &'static str {
            "no-output"
        }

        async fn compile(
            &self,
            _request: &fedshare_core::adapter::CompileRequest<'_>,
        ) -> Result<(), fedshare_core::error::BackendError> {
            Ok(())
        }
    }

    let fx = Fixture::new();
    let auth = write_file(fx.root(), "libs/auth/index.ts", "export const auth = 1;");
    let config = config(vec![SharedMapping::new("@demo/auth", auth)]);
    let adapter = fedshare_core::BuildAdapter::new(
        Arc::new(NoOutput),
        fx.normalizer.clone(),
        fx.root().to_path_buf(),
    );

    let outcomes = bundle_shared_mappings_detailed(&config, &fx.options(), &externals(&[]), &adapter)
        .await
        .unwrap();

    let err = outcomes[0].result.as_ref().unwrap_err();
    assert_eq!(err.code(), codes::SHARED_CONTENT_ADDRESS_FAILED);
}

/// Fails after the backend has already written the bundle.
struct RejectOutput;

impl fedshare_core::plugin::Plugin for RejectOutput {
    fn name(&self) -> &str {
        "reject-output"
    }

    fn render_output(
        &self,
        _code: &str,
        _output: &fedshare_core::plugin::BundleOutput,
        _ctx: &fedshare_core::plugin::PluginContext,
    ) -> fedshare_core::plugin::HookResult<Option<String>> {
        Err(fedshare_core::plugin::PluginError::new(
            "reject-output",
            "render_output",
            "rejected",
        ))
    }
}

#[tokio::test]
async fn test_failed_mapping_leaves_no_bundle_behind() {
    let fx = Fixture::new();
    let auth = write_file(fx.root(), "libs/auth/index.ts", "export const auth = 1;");
    let config = config(vec![SharedMapping::new("@demo/auth", auth)]);
    let adapter = adapter(fx.root(), &fx.backend, &fx.normalizer)
        .with_plugins(vec![Arc::new(RejectOutput)]);

    let outcomes = bundle_shared_mappings_detailed(&config, &fx.options(), &externals(&[]), &adapter)
        .await
        .unwrap();

    let err = outcomes[0].result.as_ref().unwrap_err();
    assert_eq!(err.code(), codes::SHARED_BUNDLE_FAILED);
    assert_eq!(err.backend_code(), Some(codes::BACKEND_PLUGIN_ERROR));
    // The backend did write `_demo_auth.js` before the plugin failed
    assert_eq!(fx.backend.calls().len(), 1);
    assert!(dir_entries(&fx.root().join("dist")).is_empty());
}

#[tokio::test]
async fn test_debug_field_follows_flag() {
    let fx = Fixture::new();
    let auth = write_file(fx.root(), "libs/auth/index.ts", "export const auth = 1;");
    let config = config(vec![SharedMapping::new("@demo/auth", auth.clone())]);

    let plain = fx.run(&config, &fx.options()).await;
    let json = serde_json::to_value(&plain[0]).unwrap();
    assert!(json.get("debug").is_none());

    let debug = fx.run(&config, &fx.options().with_debug(true)).await;
    let json = serde_json::to_value(&debug[0]).unwrap();
    let entry_point = json["debug"]["entryPoint"].as_str().unwrap();
    assert_eq!(entry_point, auth.to_string_lossy().replace('\\', "/"));
    assert!(!entry_point.contains('\\'));
}

#[tokio::test]
async fn test_nearest_tsconfig_is_used() {
    let fx = Fixture::new();
    let tsconfig = write_file(fx.root(), "tsconfig.json", "{}");
    let entry = write_file(fx.root(), "libs/auth/src/index.ts", "export const auth = 1;");
    let config = config(vec![SharedMapping::new("@demo/auth", entry)]);

    fx.run(&config, &fx.options().with_tsconfig("tsconfig.fallback.json"))
        .await;

    let compiled = fx.backend.calls();
    assert_eq!(compiled[0].ts_config.as_deref(), Some(tsconfig.as_path()));
}

#[tokio::test]
async fn test_default_tsconfig_when_none_found() {
    let fx = Fixture::new();
    let entry = write_file(fx.root(), "libs/auth/src/index.ts", "export const auth = 1;");
    let config = config(vec![SharedMapping::new("@demo/auth", entry)]);
    let options = fx.options().with_tsconfig("tsconfig.fallback.json");

    fx.run(&config, &options).await;

    let compiled = fx.backend.calls();
    assert_eq!(
        compiled[0].ts_config.as_deref(),
        Some(fx.root().join("tsconfig.fallback.json").as_path())
    );
}

#[tokio::test]
async fn test_package_mapping_goes_through_normalizer() {
    let fx = Fixture::new();
    let entry = write_file(fx.root(), "node_modules/left-pad/index.js", "module.exports = 1;");
    let config = config(vec![SharedMapping::new("left-pad", entry)]);

    let shared = fx.run(&config, &fx.options()).await;

    assert_eq!(shared.len(), 1);
    assert!(shared[0].out_file_name.starts_with("left_pad-"));
    assert_eq!(fx.normalizer.calls().len(), 1);
    assert!(dir_entries(&fx.root().join("node_modules/.tmp")).is_empty());
}

#[tokio::test]
async fn test_output_dir_is_created() {
    let fx = Fixture::new();
    let options = fx.options().with_output_path("dist/apps/shell");

    let shared = fx.run(&config(Vec::new()), &options).await;

    assert!(shared.is_empty());
    assert!(fx.root().join("dist/apps/shell").is_dir());
}

#[tokio::test]
async fn test_unwritable_output_dir_fails_the_batch() {
    let fx = Fixture::new();
    write_file(fx.root(), "dist", "not a directory");
    let adapter = adapter(fx.root(), &fx.backend, &fx.normalizer);

    let err = bundle_shared_mappings(&config(Vec::new()), &fx.options(), &externals(&[]), &adapter)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::OutputDir { .. }));
    assert_eq!(err.code(), codes::OUTPUT_DIR_FAILED);
}
