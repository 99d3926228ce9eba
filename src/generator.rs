//! The config generator: assemble, render, write
//!
//! Generation is idempotent. When the file on disk already holds exactly the
//! bytes that would be written, it is left untouched (mtime included), so a
//! setup script can run on every deploy without restarting the host for
//! nothing.

use crate::config::{GeneratorConfig, SettingsSchema, meta};
use crate::error::{Error, Result};
use crate::format::{Document, write_atomic};
use crate::nextcloud::{NextcloudSchema, OBJECTSTORE_KEY};
use crate::render::assemble;
use crate::value::SettingsMap;

use log::{debug, info, warn};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::Path;

/// Result of [`ConfigGenerator::generate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file did not exist
    Created,
    /// The file existed with different content and was replaced
    Updated,
    /// The file already had the rendered content
    Unchanged,
}

/// Result of [`ConfigGenerator::check`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftStatus {
    Missing,
    UpToDate,
    /// The file differs from what the current environment renders
    Stale,
}

/// Renders the host configuration from the environment
///
/// # Example
///
/// ```rust,no_run
/// use nccfg::{ConfigGenerator, GeneratorConfig, WriteOutcome};
///
/// let generator: ConfigGenerator = ConfigGenerator::new(
///     GeneratorConfig::builder()
///         .output_path("config/nextcloud/custom.config.php")
///         .build(),
/// );
///
/// match generator.generate()? {
///     WriteOutcome::Unchanged => println!("already up to date"),
///     outcome => println!("{outcome:?}"),
/// }
/// # Ok::<(), nccfg::Error>(())
/// ```
pub struct ConfigGenerator<Schema: SettingsSchema = NextcloudSchema> {
    config: GeneratorConfig,
    _schema: PhantomData<Schema>,
}

impl<Schema: SettingsSchema> ConfigGenerator<Schema> {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            _schema: PhantomData,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn output_path(&self) -> &Path {
        &self.config.output_path
    }

    /// Build the settings mapping without rendering it
    pub fn assemble(&self) -> Result<SettingsMap> {
        assemble::<Schema>(self.config.env.as_ref(), self.config.env_prefix.as_deref())
    }

    /// Serialize an already assembled mapping in the configured format
    pub fn render_settings(&self, settings: &SettingsMap) -> Result<String> {
        let titles = section_titles::<Schema>();
        let comments = value_comments::<Schema>(settings);
        let doc = Document {
            header: &self.config.header,
            settings,
            section_titles: &titles,
            value_comments: &comments,
        };
        self.config.format.backend().render(&doc)
    }

    /// Assemble and serialize
    pub fn render(&self) -> Result<String> {
        let settings = self.assemble()?;
        self.render_settings(&settings)
    }

    /// Render and write the output file if its content changed
    ///
    /// Nothing is written when assembly fails.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * A required variable is missing or malformed
    /// * An override fails validation
    /// * The existing file cannot be read or the new one cannot be written
    pub fn generate(&self) -> Result<WriteOutcome> {
        let content = self.render()?;
        let path = self.output_path();

        let outcome = match read_existing(path)? {
            Some(existing) if existing == content.as_bytes() => {
                debug!("{} is up to date", path.display());
                if self.config.secure_permissions && crate::security::is_readable_by_others(path)? {
                    warn!("{} is readable by other users, tightening", path.display());
                    crate::security::set_secure_file_permissions(path)?;
                }
                return Ok(WriteOutcome::Unchanged);
            }
            Some(_) => WriteOutcome::Updated,
            None => WriteOutcome::Created,
        };

        write_atomic(path, &content, self.config.secure_permissions)?;
        info!(
            "Wrote {} ({}, {} bytes): {:?}",
            path.display(),
            self.config.format,
            content.len(),
            outcome
        );
        Ok(outcome)
    }

    /// Compare the file on disk with what would be rendered now
    pub fn check(&self) -> Result<DriftStatus> {
        let content = self.render()?;
        let status = match read_existing(self.output_path())? {
            None => DriftStatus::Missing,
            Some(existing) if existing == content.as_bytes() => DriftStatus::UpToDate,
            Some(_) => DriftStatus::Stale,
        };
        debug!("{}: {:?}", self.output_path().display(), status);
        Ok(status)
    }
}

/// Raw bytes, so a file that is not valid UTF-8 still compares as changed
fn read_existing(path: &Path) -> Result<Option<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Comment titles keyed by the first setting of each section
fn section_titles<Schema: SettingsSchema>() -> HashMap<String, String> {
    let mut titles = HashMap::new();
    titles.insert(OBJECTSTORE_KEY.to_string(), "S3 Primary Storage".to_string());

    let metadata = Schema::get_metadata();
    let mut current: Option<String> = None;
    for key in Schema::ordered_keys() {
        let section = metadata
            .get(&key)
            .and_then(|m| m.get_meta_str(meta::SECTION))
            .map(String::from);
        if section.is_some() && section != current {
            if let Some(ref name) = section {
                titles.insert(key.clone(), capitalize(name));
            }
            current = section;
        }
    }
    titles
}

/// Value labels shown next to top-level settings, e.g. `// WARN` for a log level
fn value_comments<Schema: SettingsSchema>(settings: &SettingsMap) -> HashMap<String, String> {
    let metadata = Schema::get_metadata();
    settings
        .iter()
        .filter_map(|(key, value)| {
            let label = metadata.get(key)?.label_for(&value.to_json())?;
            Some((key.to_string(), label.to_string()))
        })
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapEnvSource;

    #[test]
    fn test_section_titles_mark_first_key_of_each_section() {
        let titles = section_titles::<NextcloudSchema>();

        assert_eq!(titles.get("objectstore").map(String::as_str), Some("S3 Primary Storage"));
        assert_eq!(titles.get("memcache.local").map(String::as_str), Some("Performance"));
        assert_eq!(titles.get("mail_smtpmode").map(String::as_str), Some("Mail"));
        assert_eq!(titles.get("overwriteprotocol").map(String::as_str), Some("Security"));
        assert_eq!(titles.get("loglevel").map(String::as_str), Some("Logging"));
        assert_eq!(titles.len(), 5);
    }

    #[test]
    fn test_value_comments_follow_rendered_value() {
        let settings = SettingsMap::new()
            .with("loglevel", 3i64)
            .unwrap()
            .with("log_type", "file")
            .unwrap();
        let comments = value_comments::<NextcloudSchema>(&settings);

        assert_eq!(comments.get("loglevel").map(String::as_str), Some("ERROR"));
        assert_eq!(comments.len(), 1);
    }

    #[test]
    fn test_render_fails_without_credentials() {
        let generator: ConfigGenerator = ConfigGenerator::new(
            GeneratorConfig::builder()
                .env_source(MapEnvSource::new())
                .build(),
        );

        let err = generator.render().unwrap_err();
        assert!(err.is_environment_error());
    }
}
