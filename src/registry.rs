//! Process-wide settings registry
//!
//! The host application reads its configuration once at start-up and keeps
//! it for the lifetime of the process. This registry gives embedders the same
//! lifecycle: it is initialized at most once, is immutable afterwards and is
//! never torn down. Picking up new values requires a process restart.

use crate::error::{Error, Result};
use crate::value::SettingsMap;
use log::info;
use std::sync::OnceLock;

static REGISTRY: OnceLock<SettingsMap> = OnceLock::new();

/// Install the mapping for the rest of the process
///
/// # Errors
///
/// `Error::AlreadyInitialized` if a mapping was installed before. Under
/// concurrent calls exactly one succeeds.
pub fn init(settings: SettingsMap) -> Result<&'static SettingsMap> {
    let mut installed = false;
    let stored = REGISTRY.get_or_init(|| {
        installed = true;
        settings
    });
    if !installed {
        return Err(Error::AlreadyInitialized);
    }
    info!("Settings registry initialized with {} keys", stored.len());
    Ok(stored)
}

/// The installed mapping, if any
pub fn get() -> Option<&'static SettingsMap> {
    REGISTRY.get()
}

pub fn is_initialized() -> bool {
    REGISTRY.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::SettingValue;

    // The registry is global, so the whole lifecycle lives in one test
    #[test]
    fn test_init_once_lifecycle() {
        let first = SettingsMap::new().with("loglevel", 2i64).unwrap();
        let second = SettingsMap::new().with("loglevel", 0i64).unwrap();

        let stored = init(first).unwrap();
        assert_eq!(stored.get("loglevel"), Some(&SettingValue::Int(2)));
        assert!(is_initialized());

        let err = init(second).unwrap_err();
        assert!(matches!(err, Error::AlreadyInitialized));
        assert_eq!(get().and_then(|s| s.get("loglevel")), Some(&SettingValue::Int(2)));
    }
}
