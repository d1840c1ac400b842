#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

//! Core of fedshare.
//!
//! Bundles the shared mappings of a module-federation build into standalone,
//! content-hashed ES modules and describes each of them with a [`SharedInfo`]
//! record for the manifest writer.
//!
//! ## Pipeline
//!
//! 1. **Locate** - find the nearest tsconfig for each mapping ([`tsconfig`])
//! 2. **Adapt** - route package entry points through a normalization pass,
//!    then compile with the primary bundler ([`adapter`])
//! 3. **Address** - hash the final bundle and rename it ([`address`])
//! 4. **Describe** - collect [`SharedInfo`] records ([`shared`])

pub mod adapter;
pub mod address;
pub mod codes;
pub mod config;
pub mod error;
pub mod federation;
pub mod plugin;
pub mod shared;
pub mod tsconfig;
pub mod version;

pub use adapter::{BuildAdapter, BundleAdapterOptions, BundleRequest, CodegenOptions};
pub use config::FederationOptions;
pub use error::{Error, MappingError};
pub use federation::{NormalizedFederationConfig, SharedMapping};
pub use shared::{
    bundle_shared_mappings, bundle_shared_mappings_detailed, MappingOutcome, SharedDebugInfo,
    SharedInfo,
};
pub use version::VERSION;
