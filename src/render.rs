//! Assembly of the settings mapping
//!
//! The object store block comes first, followed by every schema option in
//! section order. Each option takes its environment override when one is
//! set and the schema default otherwise; both are validated.

use crate::config::{EnvSource, SettingMetadata, SettingsSchema};
use crate::env::EnvironmentHandler;
use crate::error::{Error, Result};
use crate::nextcloud::OBJECTSTORE_KEY;
use crate::objectstore::ObjectStore;
use crate::value::{SettingValue, SettingsMap};
use log::{debug, info};

/// Build the full mapping for `Schema` from `env`
///
/// # Errors
///
/// * Any object store error (missing variable, bad endpoint)
/// * `Error::InvalidSettingValue` - an override does not satisfy the schema
/// * `Error::InvalidSettingMetadata` - a schema default is malformed
pub fn assemble<Schema: SettingsSchema>(
    env: &dyn EnvSource,
    env_prefix: Option<&str>,
) -> Result<SettingsMap> {
    let store = ObjectStore::from_env(env)?;
    let mut settings = SettingsMap::new();
    settings.insert(OBJECTSTORE_KEY, store.to_settings()?)?;

    let handler = EnvironmentHandler::new(env_prefix, env);
    let metadata = Schema::get_metadata();

    for key in Schema::ordered_keys() {
        let Some(setting) = metadata.get(&key) else {
            continue;
        };
        let value = resolve(&key, setting, &handler)?;
        settings.insert(key, value)?;
    }

    debug!("Assembled {} top-level settings", settings.len());
    Ok(settings)
}

fn resolve(
    key: &str,
    setting: &SettingMetadata,
    handler: &EnvironmentHandler<'_>,
) -> Result<SettingValue> {
    if let Some(value) = handler.get_env_override(key, setting.setting_type) {
        setting
            .validate(&value.to_json())
            .map_err(|reason| Error::InvalidSettingValue {
                key: key.to_string(),
                reason,
            })?;
        info!("Setting {key} overridden from environment: {}", value.to_json());
        return Ok(value);
    }

    setting
        .validate_schema()
        .map_err(|reason| Error::InvalidSettingMetadata {
            key: key.to_string(),
            reason,
        })?;
    SettingValue::from_json(&setting.default).map_err(|reason| Error::InvalidSettingMetadata {
        key: key.to_string(),
        reason,
    })
}

/// Required string fields that are empty, as dotted paths
///
/// Empty for any mapping produced by [`assemble`]; used by `check` style
/// callers that inspect a mapping from elsewhere.
pub fn empty_required_fields(settings: &SettingsMap) -> Vec<String> {
    const REQUIRED: [&str; 5] = ["bucket", "key", "secret", "hostname", "region"];

    let mut empty = Vec::new();
    let args = settings.get_path("objectstore.arguments").and_then(SettingValue::as_map);
    for field in REQUIRED {
        let present = args
            .and_then(|a| a.get(field))
            .and_then(SettingValue::as_str)
            .is_some_and(|v| !v.trim().is_empty());
        if !present {
            empty.push(format!("objectstore.arguments.{field}"));
        }
    }
    empty
}
