//! Core configuration types and traits
//!
//! This module contains the foundational types for config generation:
//! - `GeneratorConfig` - Where and how the rendered file is written
//! - `EnvSource` - Pluggable lookup of environment variables
//! - `SettingsSchema` - Trait for defining recognized settings with metadata
//! - `SettingMetadata` - Type, default and constraints of one setting

mod schema;
mod types;

pub use schema::{
    NumberConstraints, SettingConstraints, SettingMetadata, SettingOption, SettingType,
    SettingsSchema, TextConstraints, meta, opt,
};

pub use types::{
    DEFAULT_ENV_PREFIX, DEFAULT_OUTPUT_PATH, EnvSource, GeneratorConfig, GeneratorConfigBuilder,
    LayeredEnv, MapEnvSource, ProcessEnv,
};
