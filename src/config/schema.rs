//! Settings schema trait and metadata types
//!
//! # Overview
//!
//! Every option the generator may emit is described by a [`SettingMetadata`]:
//!
//! - **Type**: toggle, text, integer or select
//! - **Default**: the value rendered when no override is present
//! - **Constraints**: integer range, regex pattern or allowed options
//! - **Custom metadata**: free-form key-value pairs (section, order, description)
//!
//! ```rust
//! use nccfg::{SettingMetadata, opt};
//!
//! let port = SettingMetadata::number(25)
//!     .min(1)
//!     .max(65535)
//!     .section("mail")
//!     .description("SMTP relay port");
//!
//! let protocol = SettingMetadata::select("https", vec![
//!     opt("http", "Plain HTTP"),
//!     opt("https", "HTTPS"),
//! ]);
//!
//! assert!(port.validate_schema().is_ok());
//! assert!(protocol.validate(&serde_json::json!("gopher")).is_err());
//! ```
//!
//! # Internal Metadata Keys
//!
//! The crate reads a handful of metadata keys itself (see [`meta`]). Everything
//! else is informational and only shows up in generated docs.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;

// =============================================================================
// Well-known Metadata Keys
// =============================================================================

/// Metadata keys used by the crate itself
pub mod meta {
    /// Output section (performance, mail, ...) used for ordering and docs
    pub const SECTION: &str = "section";
    /// Position within the section
    pub const ORDER: &str = "order";
    /// Human readable description
    pub const DESCRIPTION: &str = "description";
}

// =============================================================================
// Setting Types
// =============================================================================

/// Value type of a setting
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SettingType {
    /// Boolean flag
    Toggle,
    /// Free-form string
    #[default]
    Text,
    /// Integer
    Number,
    /// One of a fixed set of strings
    Select,
}

// =============================================================================
// Type-Specific Constraints
// =============================================================================

/// Constraints for Number type settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct NumberConstraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

/// Constraints for Text type settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TextConstraints {
    /// Regex pattern for validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// Type-specific constraints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SettingConstraints {
    /// Options for Select type (REQUIRED for Select)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SettingOption>>,

    /// Display labels for individual Number values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<SettingOption>>,

    #[serde(flatten)]
    pub number: NumberConstraints,

    #[serde(flatten)]
    pub text: TextConstraints,
}

// =============================================================================
// Setting Metadata
// =============================================================================

/// Metadata for a single setting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingMetadata {
    #[serde(rename = "type")]
    pub setting_type: SettingType,

    /// Default value
    pub default: Value,

    #[serde(flatten)]
    pub constraints: SettingConstraints,

    /// Free-form metadata
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
}

impl Default for SettingMetadata {
    fn default() -> Self {
        Self {
            setting_type: SettingType::Text,
            default: Value::Null,
            constraints: SettingConstraints::default(),
            metadata: HashMap::new(),
        }
    }
}

impl SettingMetadata {
    // =========================================================================
    // Type-specific constructors
    // =========================================================================

    /// Create a string setting
    pub fn text(default: impl Into<String>) -> Self {
        Self {
            setting_type: SettingType::Text,
            default: Value::String(default.into()),
            ..Default::default()
        }
    }

    /// Create an integer setting
    pub fn number(default: impl Into<i64>) -> Self {
        Self {
            setting_type: SettingType::Number,
            default: json!(default.into()),
            ..Default::default()
        }
    }

    /// Create a boolean setting
    pub fn toggle(default: bool) -> Self {
        Self {
            setting_type: SettingType::Toggle,
            default: Value::Bool(default),
            ..Default::default()
        }
    }

    /// Create a select setting
    ///
    /// **Options are required** - you must provide them at construction time.
    pub fn select(default: impl Into<String>, options: Vec<SettingOption>) -> Self {
        Self {
            setting_type: SettingType::Select,
            default: Value::String(default.into()),
            constraints: SettingConstraints {
                options: Some(options),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    // =========================================================================
    // Dynamic metadata methods
    // =========================================================================

    #[must_use]
    pub fn meta_str(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata
            .insert(key.to_string(), Value::String(value.into()));
        self
    }

    #[must_use]
    pub fn meta_bool(mut self, key: &str, value: bool) -> Self {
        self.metadata.insert(key.to_string(), Value::Bool(value));
        self
    }

    #[must_use]
    pub fn meta_num(mut self, key: &str, value: impl Into<i64>) -> Self {
        self.metadata.insert(key.to_string(), json!(value.into()));
        self
    }

    pub fn get_meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }

    pub fn get_meta_bool(&self, key: &str) -> Option<bool> {
        self.metadata.get(key).and_then(|v| v.as_bool())
    }

    pub fn get_meta_num(&self, key: &str) -> Option<i64> {
        self.metadata.get(key).and_then(|v| v.as_i64())
    }

    /// Place the setting in an output section
    #[must_use]
    pub fn section(self, section: &str) -> Self {
        self.meta_str(meta::SECTION, section)
    }

    /// Position within the section
    #[must_use]
    pub fn order(self, order: i64) -> Self {
        self.meta_num(meta::ORDER, order)
    }

    #[must_use]
    pub fn description(self, description: &str) -> Self {
        self.meta_str(meta::DESCRIPTION, description)
    }

    // =========================================================================
    // Constraint setters (builder pattern)
    // =========================================================================

    #[must_use]
    pub fn min(mut self, val: i64) -> Self {
        self.constraints.number.min = Some(val);
        self
    }

    #[must_use]
    pub fn max(mut self, val: i64) -> Self {
        self.constraints.number.max = Some(val);
        self
    }

    /// Set regex pattern for validation
    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.constraints.text.pattern = Some(pattern.into());
        self
    }

    /// Attach a label to one value of a Number setting
    ///
    /// Labels do not restrict the value; they annotate it in rendered output
    /// and docs.
    #[must_use]
    pub fn value_label(mut self, value: i64, label: impl Into<String>) -> Self {
        self.constraints
            .labels
            .get_or_insert_with(Vec::new)
            .push(SettingOption {
                value: json!(value),
                label: label.into(),
            });
        self
    }

    /// Label attached to `value`, if any
    pub fn label_for(&self, value: &Value) -> Option<&str> {
        self.constraints
            .labels
            .as_ref()?
            .iter()
            .find(|l| l.value == *value)
            .map(|l| l.label.as_str())
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validate a value against this setting's constraints
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        match self.setting_type {
            SettingType::Toggle => {
                if !value.is_boolean() {
                    return Err("Value must be a boolean".to_string());
                }
            }
            SettingType::Number => {
                let num = value
                    .as_i64()
                    .ok_or_else(|| "Value must be an integer".to_string())?;

                if let Some(min) = self.constraints.number.min {
                    if num < min {
                        return Err(format!("Value must be at least {min}"));
                    }
                }
                if let Some(max) = self.constraints.number.max {
                    if num > max {
                        return Err(format!("Value must be at most {max}"));
                    }
                }
            }
            SettingType::Text => {
                let text = value
                    .as_str()
                    .ok_or_else(|| "Value must be a string".to_string())?;
                if let Some(ref pattern) = self.constraints.text.pattern {
                    let re = regex::Regex::new(pattern)
                        .map_err(|e| format!("Invalid regex pattern: {e}"))?;

                    if !re.is_match(text) {
                        return Err(format!("Value does not match pattern: {pattern}"));
                    }
                }
            }
            SettingType::Select => {
                if let Some(ref options) = self.constraints.options {
                    if !options.iter().any(|opt| opt.value == *value) {
                        let allowed: Vec<_> = options
                            .iter()
                            .filter_map(|o| o.value.as_str())
                            .collect();
                        return Err(format!("Value must be one of: {}", allowed.join(", ")));
                    }
                }
            }
        }
        Ok(())
    }

    /// Validate the schema definition itself
    ///
    /// Checks that:
    /// - Select type has options
    /// - Number range has min <= max
    /// - Pattern is a non-empty valid regex
    /// - Default value satisfies constraints
    pub fn validate_schema(&self) -> Result<(), String> {
        if self.setting_type == SettingType::Select && self.constraints.options.is_none() {
            return Err("Select type must have options defined".to_string());
        }

        if let (Some(min), Some(max)) = (self.constraints.number.min, self.constraints.number.max) {
            if min > max {
                return Err(format!("min ({min}) cannot be greater than max ({max})"));
            }
        }

        if let Some(ref pattern) = self.constraints.text.pattern {
            if pattern.is_empty() {
                return Err("Pattern cannot be empty string".to_string());
            }
            regex::Regex::new(pattern).map_err(|e| format!("Invalid regex pattern: {e}"))?;
        }

        self.validate(&self.default)
            .map_err(|e| format!("Default value is invalid: {e}"))?;

        Ok(())
    }
}

// =============================================================================
// Setting Option
// =============================================================================

/// Option for Select type settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettingOption {
    /// Value to store
    pub value: Value,
    /// Display label
    pub label: String,
}

impl SettingOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: Value::String(value.into()),
            label: label.into(),
        }
    }
}

// =============================================================================
// Settings Schema Trait
// =============================================================================

/// Trait for types that define the set of recognized settings
pub trait SettingsSchema {
    /// Get metadata for all settings, keyed by option name
    fn get_metadata() -> HashMap<String, SettingMetadata>;

    /// Setting keys in output order: section rank, then `order`, then key
    #[must_use]
    fn ordered_keys() -> Vec<String> {
        let metadata = Self::get_metadata();
        let sections = Self::sections();
        let rank = |m: &SettingMetadata| {
            m.get_meta_str(meta::SECTION)
                .and_then(|s| sections.iter().position(|known| known == s))
                .unwrap_or(usize::MAX)
        };

        let mut keys: Vec<(&String, &SettingMetadata)> = metadata.iter().collect();
        keys.sort_by(|(k1, m1), (k2, m2)| {
            let o1 = m1.get_meta_num(meta::ORDER).unwrap_or(i64::MAX);
            let o2 = m2.get_meta_num(meta::ORDER).unwrap_or(i64::MAX);
            (rank(*m1), o1, *k1).cmp(&(rank(*m2), o2, *k2))
        });
        keys.into_iter().map(|(k, _)| k.clone()).collect()
    }

    /// Section names in display order
    #[must_use]
    fn sections() -> Vec<String> {
        let mut sections: Vec<String> = Self::get_metadata()
            .values()
            .filter_map(|m| m.get_meta_str(meta::SECTION).map(String::from))
            .collect();
        sections.sort();
        sections.dedup();
        sections
    }

    /// Validate every entry's definition
    fn validate_all() -> crate::Result<()> {
        for (key, setting) in Self::get_metadata() {
            setting
                .validate_schema()
                .map_err(|reason| crate::Error::InvalidSettingMetadata { key, reason })?;
        }
        Ok(())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Shorthand for creating a `SettingOption`
///
/// # Example
/// ```rust
/// use nccfg::opt;
/// let options = vec![opt("file", "Log file"), opt("syslog", "Syslog")];
/// ```
pub fn opt(value: impl Into<String>, label: impl Into<String>) -> SettingOption {
    SettingOption::new(value, label)
}

/// Macro for building settings metadata `HashMap` more cleanly
///
/// # Example
/// ```rust
/// use nccfg::{settings, SettingMetadata};
///
/// let metadata = settings! {
///     "loglevel" => SettingMetadata::number(2).min(0).max(4),
///     "log_type" => SettingMetadata::text("file"),
/// };
/// assert_eq!(metadata.len(), 2);
/// ```
#[macro_export]
macro_rules! settings {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut map = std::collections::HashMap::new();
        $(
            map.insert($key.to_string(), $value);
        )*
        map
    }};
}

// =============================================================================
// Tests
// =============================================================================
