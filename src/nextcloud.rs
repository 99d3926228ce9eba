//! Options recognized by the host application
//!
//! Defaults are the values the deployment has always shipped with: APCu for
//! the local cache, Redis for distributed caching and locking, a local mail
//! relay on port 25, forced HTTPS links, Japanese phone numbers and
//! warning-level file logging.

use crate::config::{SettingMetadata, SettingOption, SettingsSchema, opt};
use crate::settings;
use std::collections::HashMap;

pub const SECTION_PERFORMANCE: &str = "performance";
pub const SECTION_MAIL: &str = "mail";
pub const SECTION_SECURITY: &str = "security";
pub const SECTION_LOGGING: &str = "logging";

/// Top-level key of the object store block
pub const OBJECTSTORE_KEY: &str = "objectstore";

fn memcache_backends() -> Vec<SettingOption> {
    vec![
        opt("\\OC\\Memcache\\APCu", "APCu (in-process)"),
        opt("\\OC\\Memcache\\ArrayCache", "Array (per-request, testing)"),
        opt("\\OC\\Memcache\\Memcached", "Memcached"),
        opt("\\OC\\Memcache\\Redis", "Redis"),
    ]
}

/// Schema of every option rendered besides the object store
pub struct NextcloudSchema;

impl SettingsSchema for NextcloudSchema {
    fn get_metadata() -> HashMap<String, SettingMetadata> {
        settings! {
            // --- performance ---
            "memcache.local" => SettingMetadata::select("\\OC\\Memcache\\APCu", memcache_backends())
                .section(SECTION_PERFORMANCE)
                .order(1)
                .description("In-process cache backend"),

            "memcache.distributed" => SettingMetadata::select("\\OC\\Memcache\\Redis", memcache_backends())
                .section(SECTION_PERFORMANCE)
                .order(2)
                .description("Cache backend shared between application servers"),

            "memcache.locking" => SettingMetadata::select("\\OC\\Memcache\\Redis", memcache_backends())
                .section(SECTION_PERFORMANCE)
                .order(3)
                .description("Backend for transactional file locks"),

            "filelocking.enabled" => SettingMetadata::toggle(true)
                .section(SECTION_PERFORMANCE)
                .order(4)
                .description("Enable transactional file locking"),

            // --- mail ---
            "mail_smtpmode" => SettingMetadata::select("smtp", vec![
                opt("smtp", "SMTP relay"),
                opt("sendmail", "Local sendmail binary"),
                opt("qmail", "Local qmail binary"),
                opt("null", "Disable outgoing mail"),
            ])
            .section(SECTION_MAIL)
            .order(1)
            .description("Mail delivery mode"),

            "mail_smtphost" => SettingMetadata::text("mailserver")
                .pattern(r"^[A-Za-z0-9]([A-Za-z0-9.-]*[A-Za-z0-9])?$")
                .section(SECTION_MAIL)
                .order(2)
                .description("Hostname of the outbound mail relay"),

            "mail_smtpport" => SettingMetadata::number(25)
                .min(1)
                .max(65535)
                .section(SECTION_MAIL)
                .order(3)
                .description("Port of the outbound mail relay"),

            // --- security ---
            "overwriteprotocol" => SettingMetadata::select("https", vec![
                opt("http", "HTTP"),
                opt("https", "HTTPS"),
            ])
            .section(SECTION_SECURITY)
            .order(1)
            .description("URL scheme forced in generated links"),

            "default_phone_region" => SettingMetadata::text("JP")
                .pattern("^[A-Z]{2}$")
                .section(SECTION_SECURITY)
                .order(2)
                .description("ISO 3166-1 region used to parse phone numbers without country code"),

            // --- logging ---
            "loglevel" => SettingMetadata::number(2)
                .min(0)
                .max(4)
                .value_label(0, "DEBUG")
                .value_label(1, "INFO")
                .value_label(2, "WARN")
                .value_label(3, "ERROR")
                .value_label(4, "FATAL")
                .section(SECTION_LOGGING)
                .order(1)
                .description("0 debug, 1 info, 2 warn, 3 error, 4 fatal"),

            "log_type" => SettingMetadata::select("file", vec![
                opt("file", "Log file in the data directory"),
                opt("errorlog", "PHP error log"),
                opt("syslog", "Syslog"),
                opt("systemd", "Systemd journal"),
            ])
            .section(SECTION_LOGGING)
            .order(2)
            .description("Log sink"),
        }
    }

    fn sections() -> Vec<String> {
        [
            SECTION_PERFORMANCE,
            SECTION_MAIL,
            SECTION_SECURITY,
            SECTION_LOGGING,
        ]
        .iter()
        .map(ToString::to_string)
        .collect()
    }
}
