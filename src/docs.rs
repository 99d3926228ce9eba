//! Documentation generator for the recognized settings
//!
//! Generates a markdown reference from `SettingsSchema` metadata, including
//! the environment variable that overrides each option.

use crate::config::{SettingMetadata, SettingType, SettingsSchema, meta};
use crate::env::env_var_name;
use crate::objectstore::{
    ENV_ACCESS_KEY, ENV_BUCKET, ENV_ENDPOINT, ENV_REGION, ENV_SECRET_KEY, S3_PORT,
};
use std::fmt::Write;

/// Configuration for docs generation
#[derive(Debug, Clone, Default)]
pub struct DocsConfig {
    /// Title for the documentation
    pub title: Option<String>,
    /// Description/introduction text
    pub description: Option<String>,
    /// Prefix used to show override variable names; None hides them
    pub env_prefix: Option<String>,
}

impl DocsConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            env_prefix: Some(crate::config::DEFAULT_ENV_PREFIX.to_string()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    #[must_use]
    pub fn with_env_prefix(mut self, prefix: Option<String>) -> Self {
        self.env_prefix = prefix;
        self
    }
}

/// Generate markdown documentation from a settings schema
#[must_use]
pub fn generate_docs<T: SettingsSchema>(config: DocsConfig) -> String {
    let metadata = T::get_metadata();
    let mut out = String::new();

    let title = config
        .title
        .clone()
        .unwrap_or_else(|| "Configuration Reference".to_string());
    let _ = writeln!(out, "# {title}\n");
    if let Some(ref desc) = config.description {
        let _ = writeln!(out, "{desc}\n");
    }

    format_object_store(&mut out);

    let mut current_section: Option<&str> = None;
    for key in T::ordered_keys() {
        let Some(setting) = metadata.get(&key) else {
            continue;
        };
        let section = setting.get_meta_str(meta::SECTION).unwrap_or("general");
        if current_section != Some(section) {
            let _ = writeln!(out, "## {}\n", capitalize(section));
            current_section = Some(section);
        }
        format_setting(&mut out, &key, setting, config.env_prefix.as_deref());
    }

    out
}

fn format_object_store(out: &mut String) {
    out.push_str("## S3 Primary Storage\n\n");
    out.push_str("Taken from the deployment environment only; no override prefix applies.\n\n");
    out.push_str("| Argument | Source |\n");
    out.push_str("|----------|--------|\n");

    for (arg, var) in [
        ("bucket", ENV_BUCKET),
        ("key", ENV_ACCESS_KEY),
        ("secret", ENV_SECRET_KEY),
        ("region", ENV_REGION),
    ] {
        let _ = writeln!(out, "| `{arg}` | `{var}` |");
    }
    let _ = writeln!(out, "| `hostname` | host of `{ENV_ENDPOINT}` |");
    let _ = writeln!(out, "| `port` | always `{S3_PORT}` |");
    for fixed in ["use_ssl", "use_path_style", "autocreate"] {
        let _ = writeln!(out, "| `{fixed}` | always `true` |");
    }
    out.push('\n');
}

fn format_setting(out: &mut String, key: &str, setting: &SettingMetadata, prefix: Option<&str>) {
    let _ = writeln!(out, "### `{key}`\n");

    if let Some(desc) = setting.get_meta_str(meta::DESCRIPTION) {
        let _ = writeln!(out, "{desc}\n");
    }

    out.push_str("| Property | Value |\n");
    out.push_str("|----------|-------|\n");
    let _ = writeln!(out, "| **Type** | {} |", format_type(setting.setting_type));
    let _ = writeln!(out, "| **Default** | `{}` |", format_value(&setting.default));

    if setting.setting_type == SettingType::Number {
        if let (Some(min), Some(max)) = (
            setting.constraints.number.min,
            setting.constraints.number.max,
        ) {
            let _ = writeln!(out, "| **Range** | {min} - {max} |");
        }
    }

    if let Some(ref pattern) = setting.constraints.text.pattern {
        let _ = writeln!(out, "| **Pattern** | `{pattern}` |");
    }

    if let Some(prefix) = prefix {
        let _ = writeln!(out, "| **Override** | `{}` |", env_var_name(prefix, key));
    }

    out.push('\n');

    if let Some(ref options) = setting.constraints.options {
        out.push_str("**Options:**\n\n");
        for opt in options {
            let _ = writeln!(out, "- `{}` - {}", format_value(&opt.value), opt.label);
        }
        out.push('\n');
    }

    if let Some(ref labels) = setting.constraints.labels {
        out.push_str("**Values:**\n\n");
        for label in labels {
            let _ = writeln!(out, "- `{}` - {}", label.value, label.label);
        }
        out.push('\n');
    }
}

fn format_type(t: SettingType) -> &'static str {
    match t {
        SettingType::Toggle => "Boolean",
        SettingType::Text => "String",
        SettingType::Number => "Integer",
        SettingType::Select => "Select",
    }
}

fn format_value(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => format!("'{s}'"),
        other => other.to_string(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nextcloud::NextcloudSchema;

    #[test]
    fn test_generate_docs() {
        let docs = generate_docs::<NextcloudSchema>(
            DocsConfig::new()
                .with_title("Nextcloud Settings")
                .with_description("Options written to custom.config.php"),
        );

        assert!(docs.starts_with("# Nextcloud Settings\n"));
        assert!(docs.contains("## S3 Primary Storage"));
        assert!(docs.contains("| `hostname` | host of `S3_ENDPOINT` |"));
        assert!(docs.contains("## Performance"));
        assert!(docs.contains("### `memcache.local`"));
        assert!(docs.contains("| **Override** | `NC_MEMCACHE_LOCAL` |"));
        assert!(docs.contains("| **Range** | 0 - 4 |"));
        assert!(docs.contains("**Values:**\n\n- `0` - DEBUG\n"));
        assert!(docs.contains("- `2` - WARN\n"));
    }

    #[test]
    fn test_sections_appear_in_output_order() {
        let docs = generate_docs::<NextcloudSchema>(DocsConfig::new());
        let pos = |needle: &str| docs.find(needle).unwrap();

        assert!(pos("## Performance") < pos("## Mail"));
        assert!(pos("## Mail") < pos("## Security"));
        assert!(pos("## Security") < pos("## Logging"));
    }

    #[test]
    fn test_without_prefix_hides_overrides() {
        let docs = generate_docs::<NextcloudSchema>(DocsConfig::new().with_env_prefix(None));
        assert!(!docs.contains("**Override**"));
    }
}
