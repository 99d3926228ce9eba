//! Environment variable overrides for schema settings
//!
//! Helper struct to encapsulate the lookup and parsing of `{PREFIX}_{KEY}`
//! variables that replace schema defaults.

use crate::config::{EnvSource, SettingType};
use crate::value::SettingValue;

/// Handles environment variable lookups and parsing
pub struct EnvironmentHandler<'a> {
    prefix: Option<&'a str>,
    source: &'a dyn EnvSource,
}

impl<'a> EnvironmentHandler<'a> {
    pub fn new(prefix: Option<&'a str>, source: &'a dyn EnvSource) -> Self {
        Self { prefix, source }
    }

    /// Get the environment variable name for a setting key
    ///
    /// Returns None if overrides are disabled.
    /// Format: {PREFIX}_{KEY} (all uppercase, dots become underscores)
    pub fn get_env_var_name(&self, key: &str) -> Option<String> {
        self.prefix.map(|prefix| env_var_name(prefix, key))
    }

    /// Check if a setting value is overridden by an environment variable
    ///
    /// The raw value is read as `setting_type`; a value that does not fit
    /// is kept as a string and fails validation later.
    pub fn get_env_override(&self, key: &str, setting_type: SettingType) -> Option<SettingValue> {
        let env_var_name = self.get_env_var_name(key)?;
        self.source
            .var(&env_var_name)
            .map(|env_value| parse_override(&env_value, setting_type))
    }
}

/// `{PREFIX}_{KEY}` with the key uppercased and dots replaced by underscores
pub fn env_var_name(prefix: &str, key: &str) -> String {
    let env_key = key.replace('.', "_").to_uppercase();
    format!("{}_{}", prefix.to_uppercase(), env_key)
}

fn parse_override(raw: &str, setting_type: SettingType) -> SettingValue {
    let trimmed = raw.trim();
    match setting_type {
        SettingType::Toggle if trimmed.eq_ignore_ascii_case("true") => SettingValue::Bool(true),
        SettingType::Toggle if trimmed.eq_ignore_ascii_case("false") => SettingValue::Bool(false),
        SettingType::Number => trimmed
            .parse::<i64>()
            .map_or_else(|_| SettingValue::String(trimmed.to_string()), SettingValue::Int),
        _ => SettingValue::String(trimmed.to_string()),
    }
}
