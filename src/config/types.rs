//! Core types for the generator: environment sources and configuration

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::format::OutputFormat;

/// Default location of the rendered file, relative to the deployment root
pub const DEFAULT_OUTPUT_PATH: &str = "config/nextcloud/custom.config.php";

/// Default prefix for setting overrides (e.g. `NC_LOGLEVEL`)
pub const DEFAULT_ENV_PREFIX: &str = "NC";

// =============================================================================
// Environment Sources
// =============================================================================

/// Source of environment variables
///
/// Abstracted so that `.env` files, the process environment and fixed maps
/// (in tests) can be combined without mutating global process state.
pub trait EnvSource: Send + Sync {
    /// Look up a variable. `None` if it is not set or not valid unicode.
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Fixed set of variables
#[derive(Debug, Clone, Default)]
pub struct MapEnvSource {
    vars: HashMap<String, String>,
}

impl MapEnvSource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnvSource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl EnvSource for MapEnvSource {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Several sources queried in order; the first one that has a variable wins
#[derive(Clone, Default)]
pub struct LayeredEnv {
    layers: Vec<Arc<dyn EnvSource>>,
}

impl LayeredEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source with lower precedence than the ones already added
    #[must_use]
    pub fn layer(mut self, source: impl EnvSource + 'static) -> Self {
        self.layers.push(Arc::new(source));
        self
    }
}

impl std::fmt::Debug for LayeredEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayeredEnv")
            .field("layers", &self.layers.len())
            .finish()
    }
}

impl EnvSource for LayeredEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.var(key))
    }
}

// =============================================================================
// Generator Configuration
// =============================================================================

/// Configuration for the [`ConfigGenerator`](crate::ConfigGenerator)
pub struct GeneratorConfig {
    /// Where the rendered file is written
    pub output_path: PathBuf,

    /// Serialization format
    pub format: OutputFormat,

    /// Prefix for setting overrides (e.g. "NC" -> NC_MAIL_SMTPHOST).
    /// If None, overrides are disabled and schema defaults are used as-is.
    pub env_prefix: Option<String>,

    /// Restrict the written file to its owner (it contains credentials)
    pub secure_permissions: bool,

    /// Comment lines placed at the top of the rendered file
    pub header: Vec<String>,

    /// Variable source
    pub env: Arc<dyn EnvSource>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfigBuilder::new().build()
    }
}

impl std::fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("output_path", &self.output_path)
            .field("format", &self.format)
            .field("env_prefix", &self.env_prefix)
            .field("secure_permissions", &self.secure_permissions)
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}

impl GeneratorConfig {
    /// Create a new builder for GeneratorConfig
    ///
    /// # Example
    /// ```rust
    /// use nccfg::{GeneratorConfig, OutputFormat};
    ///
    /// let config = GeneratorConfig::builder()
    ///     .output_path("/srv/nextcloud/config/custom.config.php")
    ///     .format(OutputFormat::Php)
    ///     .build();
    /// assert_eq!(config.env_prefix.as_deref(), Some("NC"));
    /// ```
    pub fn builder() -> GeneratorConfigBuilder {
        GeneratorConfigBuilder::new()
    }
}

/// Builder for creating GeneratorConfig with a fluent API
#[derive(Clone)]
pub struct GeneratorConfigBuilder {
    output_path: PathBuf,
    format: OutputFormat,
    env_prefix: Option<String>,
    secure_permissions: bool,
    header: Vec<String>,
    env: Arc<dyn EnvSource>,
}

impl std::fmt::Debug for GeneratorConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorConfigBuilder")
            .field("output_path", &self.output_path)
            .field("format", &self.format)
            .field("env_prefix", &self.env_prefix)
            .field("secure_permissions", &self.secure_permissions)
            .finish_non_exhaustive()
    }
}

impl Default for GeneratorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratorConfigBuilder {
    pub fn new() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            format: OutputFormat::Php,
            env_prefix: Some(DEFAULT_ENV_PREFIX.to_string()),
            secure_permissions: true,
            header: default_header(),
            env: Arc::new(ProcessEnv),
        }
    }

    /// Set the output file
    ///
    /// Supports `~` expansion for home directory.
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        let expanded = if path.starts_with("~") {
            if let Some(home) = dirs::home_dir() {
                home.join(path.strip_prefix("~").unwrap_or(&path))
            } else {
                path
            }
        } else {
            path
        };
        self.output_path = expanded;
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Enable setting overrides with the given prefix
    ///
    /// `{PREFIX}_{KEY}` (uppercase, dots become underscores) overrides the
    /// schema default, e.g. `NC_MEMCACHE_LOCAL` for `memcache.local`.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Render schema defaults only
    pub fn without_env_overrides(mut self) -> Self {
        self.env_prefix = None;
        self
    }

    pub fn secure_permissions(mut self, enabled: bool) -> Self {
        self.secure_permissions = enabled;
        self
    }

    /// Replace the header comment lines
    pub fn header<I, L>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        self.header = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Set the variable source (defaults to the process environment)
    pub fn env_source(mut self, source: impl EnvSource + 'static) -> Self {
        self.env = Arc::new(source);
        self
    }

    pub fn build(self) -> GeneratorConfig {
        GeneratorConfig {
            output_path: self.output_path,
            format: self.format,
            env_prefix: self.env_prefix,
            secure_permissions: self.secure_permissions,
            header: self.header,
            env: self.env,
        }
    }
}

fn default_header() -> Vec<String> {
    vec![
        "Nextcloud custom configuration".to_string(),
        String::new(),
        "S3 primary storage, cache backends, mail relay and logging.".to_string(),
        "Generated by nccfg from the deployment environment; do not edit by hand.".to_string(),
        "Regenerate with `nccfg render` and restart the container to apply.".to_string(),
    ]
}
