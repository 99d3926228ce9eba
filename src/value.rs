//! The settings mapping handed to the host application
//!
//! A [`SettingsMap`] is an insertion-ordered mapping from option names to
//! [`SettingValue`]s. Keys are unique and the order is stable, so rendering
//! the same mapping twice always produces the same bytes.

use crate::error::{Error, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A single configuration value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    String(String),
    /// Nested mapping (e.g. object store arguments)
    Map(SettingsMap),
}

impl SettingValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SettingValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&SettingsMap> {
        match self {
            SettingValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Convert a JSON value into a setting value
    ///
    /// Only booleans, integers and strings have a counterpart; anything else
    /// is rejected with a description of what was found.
    pub fn from_json(value: &serde_json::Value) -> std::result::Result<Self, String> {
        match value {
            serde_json::Value::Bool(b) => Ok(SettingValue::Bool(*b)),
            serde_json::Value::String(s) => Ok(SettingValue::String(s.clone())),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(SettingValue::Int)
                .ok_or_else(|| format!("Number {n} is not an integer")),
            other => Err(format!("Unsupported value: {other}")),
        }
    }

    /// Convert into the JSON representation used for schema validation
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            SettingValue::Bool(b) => serde_json::Value::Bool(*b),
            SettingValue::Int(n) => serde_json::Value::from(*n),
            SettingValue::String(s) => serde_json::Value::String(s.clone()),
            SettingValue::Map(m) => serde_json::Value::Object(
                m.iter().map(|(k, v)| (k.to_string(), v.to_json())).collect(),
            ),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(b: bool) -> Self {
        SettingValue::Bool(b)
    }
}

impl From<i64> for SettingValue {
    fn from(n: i64) -> Self {
        SettingValue::Int(n)
    }
}

impl From<u16> for SettingValue {
    fn from(n: u16) -> Self {
        SettingValue::Int(i64::from(n))
    }
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        SettingValue::String(s.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(s: String) -> Self {
        SettingValue::String(s)
    }
}

impl From<SettingsMap> for SettingValue {
    fn from(m: SettingsMap) -> Self {
        SettingValue::Map(m)
    }
}

impl Serialize for SettingValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            SettingValue::Bool(b) => serializer.serialize_bool(*b),
            SettingValue::Int(n) => serializer.serialize_i64(*n),
            SettingValue::String(s) => serializer.serialize_str(s),
            SettingValue::Map(m) => m.serialize(serializer),
        }
    }
}

/// Insertion-ordered mapping with unique keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsMap {
    entries: Vec<(String, SettingValue)>,
}

impl SettingsMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a key. Fails if the key is already present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<SettingValue>) -> Result<()> {
        let key = key.into();
        if self.contains_key(&key) {
            return Err(Error::DuplicateKey(key));
        }
        self.entries.push((key, value.into()));
        Ok(())
    }

    /// Builder-style insert, used when assembling fixed sub-mappings
    pub fn with(mut self, key: impl Into<String>, value: impl Into<SettingValue>) -> Result<Self> {
        self.insert(key, value)?;
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Look up a value, descending into nested maps on `.`
    ///
    /// Top-level keys may themselves contain dots (`memcache.local`), so the
    /// full path is tried first before splitting.
    pub fn get_path(&self, path: &str) -> Option<&SettingValue> {
        if let Some(value) = self.get(path) {
            return Some(value);
        }
        let mut split_at = path.len();
        while let Some(idx) = path[..split_at].rfind('.') {
            let (head, tail) = (&path[..idx], &path[idx + 1..]);
            if let Some(SettingValue::Map(inner)) = self.get(head) {
                if let Some(value) = inner.get_path(tail) {
                    return Some(value);
                }
            }
            split_at = idx;
        }
        None
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl Serialize for SettingsMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
