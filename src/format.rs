//! Output formats and atomic file writes

use crate::error::{Error, Result};
use crate::value::{SettingValue, SettingsMap};
use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt::Write as _;
use std::io::{ErrorKind, Write as _};
use std::path::Path;

const INDENT: &str = "    ";

/// A rendered document: the mapping plus presentation details
#[derive(Debug, Clone, Copy)]
pub struct Document<'a> {
    /// Comment lines for the file header
    pub header: &'a [String],
    /// The settings themselves
    pub settings: &'a SettingsMap,
    /// Section titles, keyed by the first top-level key of each section
    pub section_titles: &'a HashMap<String, String>,
    /// Trailing comments for top-level values, keyed by setting
    pub value_comments: &'a HashMap<String, String>,
}

/// Trait for output format implementations
pub trait FormatBackend {
    /// File extension for this format (e.g., "php", "json")
    fn extension(&self) -> &str;

    /// Serialize a document. Identical input must give identical output.
    fn render(&self, doc: &Document<'_>) -> Result<String>;
}

// =============================================================================
// PHP
// =============================================================================

/// `<?php $CONFIG = [...];` as read by the host application
#[derive(Debug, Clone, Copy, Default)]
pub struct PhpFormat;

impl PhpFormat {
    /// Single-quoted PHP string literal
    pub fn quote(s: &str) -> String {
        let mut out = String::with_capacity(s.len() + 2);
        out.push('\'');
        for c in s.chars() {
            if c == '\\' || c == '\'' {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('\'');
        out
    }

    fn write_entries(out: &mut String, map: &SettingsMap, depth: usize, doc: Option<&Document<'_>>) {
        let pad = INDENT.repeat(depth);
        for (key, value) in map.iter() {
            if let Some(title) = doc.and_then(|d| d.section_titles.get(key)) {
                let _ = write!(out, "\n{pad}// --- {title} ---\n");
            }
            let _ = write!(out, "{pad}{} => ", Self::quote(key));
            let literal = match value {
                SettingValue::Map(inner) => {
                    out.push_str("[\n");
                    Self::write_entries(out, inner, depth + 1, None);
                    let _ = writeln!(out, "{pad}],");
                    continue;
                }
                SettingValue::Bool(b) => b.to_string(),
                SettingValue::Int(n) => n.to_string(),
                SettingValue::String(s) => Self::quote(s),
            };
            match doc.and_then(|d| d.value_comments.get(key)) {
                Some(comment) => {
                    let _ = writeln!(out, "{literal},  // {comment}");
                }
                None => {
                    let _ = writeln!(out, "{literal},");
                }
            }
        }
    }
}

impl FormatBackend for PhpFormat {
    fn extension(&self) -> &str {
        "php"
    }

    fn render(&self, doc: &Document<'_>) -> Result<String> {
        let mut out = String::from("<?php\n");
        if !doc.header.is_empty() {
            out.push_str("/**\n");
            for line in doc.header {
                if line.is_empty() {
                    out.push_str(" *\n");
                } else {
                    // A literal "*/" would end the comment early
                    let _ = writeln!(out, " * {}", line.replace("*/", "* /"));
                }
            }
            out.push_str(" */\n");
        }
        out.push_str("$CONFIG = [\n");
        Self::write_entries(&mut out, doc.settings, 1, Some(doc));
        out.push_str("];\n");
        Ok(out)
    }
}

// =============================================================================
// JSON
// =============================================================================

/// `{"system": {...}}`, the layout accepted by the host's config import
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl FormatBackend for JsonFormat {
    fn extension(&self) -> &str {
        "json"
    }

    fn render(&self, doc: &Document<'_>) -> Result<String> {
        let wrapped = SettingsMap::new().with("system", doc.settings.clone())?;
        let mut out = serde_json::to_string_pretty(&wrapped)?;
        out.push('\n');
        Ok(out)
    }
}

// =============================================================================
// Format selection
// =============================================================================

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// PHP array file (custom.config.php)
    #[default]
    Php,
    /// JSON for `occ config:import`
    Json,
}

impl OutputFormat {
    pub fn backend(self) -> &'static dyn FormatBackend {
        match self {
            OutputFormat::Php => &PhpFormat,
            OutputFormat::Json => &JsonFormat,
        }
    }

    /// Pick the format from a file extension, defaulting to PHP
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
            _ => OutputFormat::Php,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.backend().extension())
    }
}

// =============================================================================
// File output
// =============================================================================

/// Write `content` to `path` atomically
///
/// The content goes to a sibling temp file that is created owner-only, so
/// the credentials it carries are never readable by other users. The temp
/// file then gets its final mode and is renamed over the target; readers
/// never see a partially written file. On any failure the temp file is
/// removed.
///
/// With `secure` the result is restricted to its owner. Without it, an
/// existing target keeps its mode and a new file stays owner-only.
pub fn write_atomic(path: &Path, content: &str, secure: bool) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| Error::DirectoryCreate {
        path: parent.to_path_buf(),
        source: e,
    })?;

    let file_name = path.file_name().ok_or_else(|| {
        Error::Config(format!(
            "Invalid path '{}': must have a filename",
            path.display()
        ))
    })?;
    let mut prefix = OsString::from(".");
    prefix.push(file_name);
    prefix.push(".");

    let previous = if secure {
        None
    } else {
        existing_permissions(path)?
    };

    // Dropping `temp` on an early return deletes it
    let mut temp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| Error::FileWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;

    let written = temp
        .write_all(content.as_bytes())
        .and_then(|()| temp.as_file().sync_all());
    if let Err(e) = written {
        return Err(Error::FileWrite {
            path: temp.path().to_path_buf(),
            source: e,
        });
    }

    if secure {
        crate::security::set_secure_file_permissions(temp.path())?;
    } else if let Some(perms) = previous {
        std::fs::set_permissions(temp.path(), perms).map_err(|e| Error::FileWrite {
            path: temp.path().to_path_buf(),
            source: e,
        })?;
    }

    temp.persist(path).map_err(|e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

fn existing_permissions(path: &Path) -> Result<Option<std::fs::Permissions>> {
    match std::fs::metadata(path) {
        Ok(metadata) => Ok(Some(metadata.permissions())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> SettingsMap {
        let args = SettingsMap::new()
            .with("bucket", "nc")
            .unwrap()
            .with("port", 443u16)
            .unwrap()
            .with("use_ssl", true)
            .unwrap();
        let store = SettingsMap::new()
            .with("class", "\\OC\\Files\\ObjectStore\\S3")
            .unwrap()
            .with("arguments", args)
            .unwrap();
        SettingsMap::new()
            .with("objectstore", store)
            .unwrap()
            .with("loglevel", 2i64)
            .unwrap()
    }

    #[test]
    fn test_php_quote_escapes_backslash_and_quote() {
        assert_eq!(PhpFormat::quote("\\OC\\Memcache\\APCu"), r"'\\OC\\Memcache\\APCu'");
        assert_eq!(PhpFormat::quote("it's"), r"'it\'s'");
        assert_eq!(PhpFormat::quote(""), "''");
    }

    #[test]
    fn test_php_render_layout() {
        let settings = sample();
        let header = vec!["Custom config".to_string(), String::new()];
        let titles: HashMap<String, String> = [
            ("objectstore".to_string(), "S3 Primary Storage".to_string()),
            ("loglevel".to_string(), "Logging".to_string()),
        ]
        .into_iter()
        .collect();
        let comments: HashMap<String, String> =
            [("loglevel".to_string(), "WARN".to_string())].into_iter().collect();
        let doc = Document {
            header: &header,
            settings: &settings,
            section_titles: &titles,
            value_comments: &comments,
        };

        let php = PhpFormat.render(&doc).unwrap();
        let expected = r"<?php
/**
 * Custom config
 *
 */
$CONFIG = [

    // --- S3 Primary Storage ---
    'objectstore' => [
        'class' => '\\OC\\Files\\ObjectStore\\S3',
        'arguments' => [
            'bucket' => 'nc',
            'port' => 443,
            'use_ssl' => true,
        ],
    ],

    // --- Logging ---
    'loglevel' => 2,  // WARN
];
";
        assert_eq!(php, expected);
    }

    #[test]
    fn test_json_render_wraps_in_system() {
        let settings = sample();
        let titles = HashMap::new();
        let comments = HashMap::from([("loglevel".to_string(), "WARN".to_string())]);
        let doc = Document {
            header: &[],
            settings: &settings,
            section_titles: &titles,
            value_comments: &comments,
        };

        let json = JsonFormat.render(&doc).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["system"]["objectstore"]["arguments"]["port"], 443);
        assert_eq!(parsed["system"]["loglevel"], 2);
        assert!(json.ends_with("}\n"));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("x/custom.config.php")), OutputFormat::Php);
        assert_eq!(OutputFormat::from_path(Path::new("x/config.JSON")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("noext")), OutputFormat::Php);
    }

    #[test]
    fn test_write_atomic_creates_parents_and_leaves_no_temp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config/nextcloud/custom.config.php");

        write_atomic(&path, "<?php\n", true).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<?php\n");
        assert_eq!(temp_files(path.parent().unwrap()), Vec::<String>::new());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    fn temp_files(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect()
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let dir = tempdir().unwrap();
        // A non-empty directory cannot be replaced by a file
        let path = dir.path().join("custom.config.php");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "").unwrap();

        let err = write_atomic(&path, "<?php\n", true).unwrap_err();

        assert!(err.is_io_error());
        assert_eq!(temp_files(dir.path()), Vec::<String>::new());
        assert!(path.join("keep").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_insecure_write_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.config.php");
        std::fs::write(&path, "<?php\n// old\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        write_atomic(&path, "<?php\n", false).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<?php\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_new_file_is_owner_only_without_secure_flag() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.config.php");

        write_atomic(&path, "<?php\n", false).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0);
    }
}
