//! # nccfg - Nextcloud config renderer
//!
//! Renders the host application's `custom.config.php` from deployment
//! environment variables, the step a setup script runs before the container
//! starts.
//!
//! ## Features
//!
//! - **S3 Primary Storage**: bucket, credentials, region and endpoint host from `S3_*` variables
//! - **Schema Validation**: cache backends, mail relay, URL scheme, phone region and logging
//!   options are typed, range-checked and pattern-checked
//! - **Overrides**: `NC_*` variables replace any schema default (e.g. `NC_LOGLEVEL=0`)
//! - **`.env` Files**: read without touching the process environment
//! - **Idempotent Writes**: atomic, owner-only, and skipped when nothing changed
//! - **Formats**: PHP array file or JSON for `occ config:import`
//!
//! ## Quick Start
//!
//! ```rust
//! use nccfg::{ConfigGenerator, GeneratorConfig, MapEnvSource, SettingValue};
//!
//! let env = MapEnvSource::new()
//!     .set("S3_BUCKET_NEXTCLOUD", "family-cloud")
//!     .set("S3_ACCESS_KEY", "AKIAEXAMPLE")
//!     .set("S3_SECRET_KEY", "secret")
//!     .set("S3_ENDPOINT", "https://objects.example.com:9000/ignored")
//!     .set("S3_REGION", "ap-northeast-1");
//!
//! let generator: ConfigGenerator = ConfigGenerator::new(
//!     GeneratorConfig::builder().env_source(env).build(),
//! );
//!
//! let settings = generator.assemble()?;
//! assert_eq!(
//!     settings.get_path("objectstore.arguments.hostname"),
//!     Some(&SettingValue::from("objects.example.com")),
//! );
//!
//! let php = generator.render()?;
//! assert!(php.starts_with("<?php"));
//! # Ok::<(), nccfg::Error>(())
//! ```
//!
//! ## Lifecycle
//!
//! The host reads the rendered file once at start-up and never reloads it.
//! Embedders that want the same semantics in-process can hand the assembled
//! mapping to [`registry::init`], which accepts exactly one mapping per
//! process.

// Core modules
mod docs;
mod env;
mod error;
mod generator;
mod render;
mod value;

pub mod dotenv;
pub mod format;
pub mod nextcloud;
pub mod objectstore;
pub mod registry;
pub mod security;

// Grouped modules
pub mod config;

// Re-exports from core
pub use docs::{DocsConfig, generate_docs};
pub use env::{EnvironmentHandler, env_var_name};
pub use error::{Error, Result};
pub use generator::{ConfigGenerator, DriftStatus, WriteOutcome};
pub use render::{assemble, empty_required_fields};
pub use value::{SettingValue, SettingsMap};

pub use dotenv::DotenvSource;
pub use format::OutputFormat;
pub use nextcloud::NextcloudSchema;
pub use objectstore::{ObjectStore, ObjectStoreClass, S3Arguments};

// Re-exports from config
pub use config::{
    EnvSource, GeneratorConfig, GeneratorConfigBuilder, LayeredEnv, MapEnvSource, ProcessEnv,
    SettingMetadata, SettingOption, SettingType, SettingsSchema, meta, opt,
};
