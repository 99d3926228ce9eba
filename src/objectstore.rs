//! S3 primary object storage
//!
//! The object store block is the only part of the configuration that is
//! driven entirely by deployment credentials. Connection constants (port,
//! TLS, path-style addressing, bucket auto-creation) are fixed and cannot be
//! changed through the environment.

use crate::config::EnvSource;
use crate::error::{Error, Result};
use crate::value::SettingsMap;
use log::debug;
use url::{Host, Url};

/// Bucket holding the primary storage
pub const ENV_BUCKET: &str = "S3_BUCKET_NEXTCLOUD";
/// Access key id
pub const ENV_ACCESS_KEY: &str = "S3_ACCESS_KEY";
/// Secret access key
pub const ENV_SECRET_KEY: &str = "S3_SECRET_KEY";
/// Endpoint URL; only its host is used
pub const ENV_ENDPOINT: &str = "S3_ENDPOINT";
/// Bucket region
pub const ENV_REGION: &str = "S3_REGION";

/// Every variable that must be present and non-empty
pub const REQUIRED_VARIABLES: [&str; 5] =
    [ENV_BUCKET, ENV_ACCESS_KEY, ENV_SECRET_KEY, ENV_ENDPOINT, ENV_REGION];

/// HTTPS port; the endpoint's own port is ignored
pub const S3_PORT: u16 = 443;

/// Object store backend implementation selected in the host application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectStoreClass {
    #[default]
    S3,
}

impl ObjectStoreClass {
    /// Fully qualified class name understood by the host application
    pub fn class_name(self) -> &'static str {
        match self {
            ObjectStoreClass::S3 => "\\OC\\Files\\ObjectStore\\S3",
        }
    }
}

/// Connection parameters of the S3 backend
#[derive(Clone, PartialEq, Eq)]
pub struct S3Arguments {
    pub bucket: String,
    pub key: String,
    pub secret: String,
    pub hostname: String,
    pub port: u16,
    pub use_ssl: bool,
    pub region: String,
    pub use_path_style: bool,
    pub autocreate: bool,
}

// Hand-written so the secret never ends up in logs
impl std::fmt::Debug for S3Arguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Arguments")
            .field("bucket", &self.bucket)
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("use_ssl", &self.use_ssl)
            .field("region", &self.region)
            .field("use_path_style", &self.use_path_style)
            .field("autocreate", &self.autocreate)
            .finish()
    }
}

impl S3Arguments {
    /// Build the arguments from the `S3_*` variables
    ///
    /// # Errors
    ///
    /// * `Error::MissingVariable` / `Error::EmptyVariable` - a required variable is absent or blank
    /// * `Error::InvalidEndpoint` - `S3_ENDPOINT` is not an absolute URL with a host
    pub fn from_env(env: &dyn EnvSource) -> Result<Self> {
        let endpoint = required(env, ENV_ENDPOINT)?;
        let hostname = endpoint_host(&endpoint)?;

        let args = Self {
            bucket: required(env, ENV_BUCKET)?,
            key: required(env, ENV_ACCESS_KEY)?,
            secret: required(env, ENV_SECRET_KEY)?,
            hostname,
            port: S3_PORT,
            use_ssl: true,
            region: required(env, ENV_REGION)?,
            use_path_style: true,
            autocreate: true,
        };
        debug!("Resolved object store: {args:?}");
        Ok(args)
    }

    /// Check that no required field is empty
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("bucket", &self.bucket),
            ("key", &self.key),
            ("secret", &self.secret),
            ("hostname", &self.hostname),
            ("region", &self.region),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(Error::InvalidSettingValue {
                    key: format!("objectstore.arguments.{name}"),
                    reason: "Value must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// The `arguments` sub-mapping
    pub fn to_settings(&self) -> Result<SettingsMap> {
        SettingsMap::new()
            .with("bucket", self.bucket.as_str())?
            .with("key", self.key.as_str())?
            .with("secret", self.secret.as_str())?
            .with("hostname", self.hostname.as_str())?
            .with("port", self.port)?
            .with("use_ssl", self.use_ssl)?
            .with("region", self.region.as_str())?
            .with("use_path_style", self.use_path_style)?
            .with("autocreate", self.autocreate)
    }
}

/// Primary storage selection: backend class plus its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStore {
    pub class: ObjectStoreClass,
    pub arguments: S3Arguments,
}

impl ObjectStore {
    pub fn from_env(env: &dyn EnvSource) -> Result<Self> {
        let arguments = S3Arguments::from_env(env)?;
        arguments.validate()?;
        Ok(Self {
            class: ObjectStoreClass::S3,
            arguments,
        })
    }

    /// The `objectstore` mapping: `class` then `arguments`
    pub fn to_settings(&self) -> Result<SettingsMap> {
        SettingsMap::new()
            .with("class", self.class.class_name())?
            .with("arguments", self.arguments.to_settings()?)
    }
}

/// Host component of an endpoint URL
///
/// Scheme, port, path and credentials are discarded. Domain names come back
/// lowercased; IPv6 literals come back without brackets.
///
/// ```rust
/// use nccfg::objectstore::endpoint_host;
///
/// let host = endpoint_host("https://objects.example.com:9000/ignored").unwrap();
/// assert_eq!(host, "objects.example.com");
/// ```
pub fn endpoint_host(endpoint: &str) -> Result<String> {
    let invalid = |reason: String| Error::InvalidEndpoint {
        url: endpoint.to_string(),
        reason,
    };

    let url = Url::parse(endpoint.trim()).map_err(|e| invalid(e.to_string()))?;
    let host = match url.host() {
        Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
        Some(Host::Ipv4(addr)) => addr.to_string(),
        Some(Host::Ipv6(addr)) => addr.to_string(),
        _ => return Err(invalid("URL has no host".to_string())),
    };
    Ok(host)
}

fn required(env: &dyn EnvSource, name: &str) -> Result<String> {
    let value = env
        .var(name)
        .ok_or_else(|| Error::MissingVariable(name.to_string()))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyVariable(name.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapEnvSource;
    use crate::value::SettingValue;

    fn full_env() -> MapEnvSource {
        MapEnvSource::new()
            .set(ENV_BUCKET, "family-cloud")
            .set(ENV_ACCESS_KEY, "AKIAEXAMPLE")
            .set(ENV_SECRET_KEY, "wJalrXUtnFEMI")
            .set(ENV_ENDPOINT, "https://objects.example.com:9000/ignored")
            .set(ENV_REGION, "ap-northeast-1")
    }

    #[test]
    fn test_endpoint_host_strips_port_and_path() {
        assert_eq!(
            endpoint_host("https://objects.example.com:9000/ignored").unwrap(),
            "objects.example.com"
        );
        assert_eq!(
            endpoint_host("http://user:pw@minio.local/bucket?x=1").unwrap(),
            "minio.local"
        );
        assert_eq!(endpoint_host("https://10.0.0.5:9000").unwrap(), "10.0.0.5");
        assert_eq!(endpoint_host("https://[::1]:9000/").unwrap(), "::1");
    }

    #[test]
    fn test_endpoint_without_scheme_is_rejected() {
        let err = endpoint_host("objects.example.com").unwrap_err();
        assert!(matches!(err, Error::InvalidEndpoint { .. }));

        assert!(endpoint_host("mailto:ops@example.com").is_err());
        assert!(endpoint_host("").is_err());
    }

    #[test]
    fn test_fixed_connection_constants() {
        let env = full_env()
            .set("S3_PORT", "9000")
            .set("S3_USE_SSL", "false");
        let args = S3Arguments::from_env(&env).unwrap();

        assert_eq!(args.port, 443);
        assert!(args.use_ssl);
        assert!(args.use_path_style);
        assert!(args.autocreate);
        assert_eq!(args.hostname, "objects.example.com");
    }

    #[test]
    fn test_missing_and_empty_variables() {
        let env: MapEnvSource = [(ENV_BUCKET, "b")].into_iter().collect();
        assert!(matches!(
            S3Arguments::from_env(&env).unwrap_err(),
            Error::MissingVariable(ref v) if v == ENV_ENDPOINT
        ));

        let env = full_env().set(ENV_SECRET_KEY, "   ");
        assert!(matches!(
            S3Arguments::from_env(&env).unwrap_err(),
            Error::EmptyVariable(ref v) if v == ENV_SECRET_KEY
        ));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let args = S3Arguments::from_env(&full_env()).unwrap();
        let printed = format!("{args:?}");

        assert!(printed.contains("<redacted>"));
        assert!(!printed.contains("wJalrXUtnFEMI"));
    }

    #[test]
    fn test_settings_shape() {
        let store = ObjectStore::from_env(&full_env()).unwrap();
        let map = store.to_settings().unwrap();

        assert_eq!(
            map.get("class").and_then(SettingValue::as_str),
            Some("\\OC\\Files\\ObjectStore\\S3")
        );
        let args = map.get("arguments").and_then(SettingValue::as_map).unwrap();
        let keys: Vec<_> = args.keys().collect();
        assert_eq!(
            keys,
            vec![
                "bucket",
                "key",
                "secret",
                "hostname",
                "port",
                "use_ssl",
                "region",
                "use_path_style",
                "autocreate"
            ]
        );
        assert_eq!(args.get("port"), Some(&SettingValue::Int(443)));
    }
}
