//! Application configuration.
//!
//! Configuration is read once at startup from a YAML file whose values live
//! under the top-level `app` key, layered over built-in defaults and then
//! overridden by `REGCOPY_`-prefixed environment variables:
//!
//! ```yaml
//! app:
//!   executable: docker
//!   source_url: registry.internal:5000
//!   source_login: robot
//!   source_password: secret
//!   source_include: "^team/"
//!   destination_url: registry.example.com
//!   destination_login: robot
//!   destination_password: secret
//! ```
//!
//! Keys under `app` are matched ignoring case and underscores, so files
//! written as `sourceUrl: ...` load the same as `source_url: ...`.
//!
//! The resulting [`Config`] is passed explicitly to whoever needs it.

use crate::auth::Credentials;
use crate::error::{RegcopyError, Result};
use config::{Config as ConfigRs, ConfigError, Environment, File, FileFormat, Map, Source, ValueKind};
use serde::{Deserialize, Serialize};
use std::path::Path;


/// Prefix for environment variable overrides, e.g. `REGCOPY_APP__SOURCE_PASSWORD`.
pub const ENV_PREFIX: &str = "REGCOPY";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
}

impl Config {
    /// Parses a `Config` from a YAML string.
    ///
    /// Environment variables are not consulted. This function is primarily
    /// used for testing.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Self::from_sources(File::from_str(s, FileFormat::Yaml), None, None)
    }

    /// Loads a `Config` from a YAML file, applying environment overrides.
    ///
    /// The file must exist; a missing or unreadable file is a configuration
    /// error.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_environment(path, Self::environment())
    }

    fn load_with_environment(path: &Path, environment: Environment) -> Result<Self> {
        let file = File::from(path).format(FileFormat::Yaml).required(true);
        Self::from_sources(file, Some(environment), Some(path))
    }

    /// Values stay strings; serde converts the numeric and boolean fields.
    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
    }

    /// Reads the file, renames its `app` keys to their canonical spelling and
    /// layers the environment on top.
    fn from_sources<S>(file: S, environment: Option<Environment>, path: Option<&Path>) -> Result<Self>
    where
        S: Source + Send + Sync + 'static,
    {
        let path = path.map(|p| p.display().to_string());
        let fail = |message: &str, e: ConfigError| {
            RegcopyError::config_with_source(message.to_string(), path.clone(), e)
        };

        let mut file_values = ConfigRs::builder()
            .add_source(file)
            .build()
            .and_then(|cfg| cfg.collect())
            .map_err(|e| fail("Failed to read configuration", e))?;

        let mut builder = ConfigRs::builder();
        if let Some(app) = file_values.remove("app") {
            let table = match app.kind {
                ValueKind::Nil => Map::new(),
                _ => app
                    .into_table()
                    .map_err(|e| fail("Configuration key 'app' must be a mapping", e))?,
            };
            for (key, value) in table {
                if matches!(value.kind, ValueKind::Nil) {
                    continue;
                }
                builder = builder
                    .set_default(format!("app.{}", canonical_key(&key)), value)
                    .map_err(|e| fail("Invalid configuration key", e))?;
            }
        }
        if let Some(environment) = environment {
            builder = builder.add_source(environment);
        }

        builder
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| fail("Failed to deserialize configuration", e))
    }

    /// Checks the settings a copy run cannot do without.
    pub fn validate(&self) -> Result<()> {
        let app = &self.app;
        for (key, value) in [
            ("app.executable", &app.executable),
            ("app.source_url", &app.source_url),
            ("app.destination_url", &app.destination_url),
        ] {
            if value.trim().is_empty() {
                return Err(RegcopyError::config(
                    format!("Missing required setting '{}'", key),
                    None,
                ));
            }
        }
        Ok(())
    }
}

/// Settings for one copy run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Container engine executable used for login/pull/tag/push/rm.
    #[serde(default = "default_executable")]
    pub executable: String,

    #[serde(default)]
    pub source_url: String,

    #[serde(default)]
    pub source_login: String,

    #[serde(default)]
    pub source_password: String,

    /// Regular expression selecting which source repositories to copy.
    #[serde(default = "default_source_include")]
    pub source_include: String,

    #[serde(default)]
    pub destination_url: String,

    #[serde(default)]
    pub destination_login: String,

    #[serde(default)]
    pub destination_password: String,

    /// Remove local images left behind when tag or push fails.
    #[serde(default)]
    pub cleanup_on_failure: bool,

    /// Registry request timeout in seconds; 0 means none.
    #[serde(default)]
    pub timeout: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            source_url: String::new(),
            source_login: String::new(),
            source_password: String::new(),
            source_include: default_source_include(),
            destination_url: String::new(),
            destination_login: String::new(),
            destination_password: String::new(),
            cleanup_on_failure: false,
            timeout: 0,
        }
    }
}

impl AppConfig {
    /// The registry images are copied from.
    pub fn source(&self) -> RegistryEndpoint {
        RegistryEndpoint::new(
            &self.source_url,
            Credentials::from_login(&self.source_login, &self.source_password),
        )
    }

    /// The registry images are copied to.
    pub fn destination(&self) -> RegistryEndpoint {
        RegistryEndpoint::new(
            &self.destination_url,
            Credentials::from_login(&self.destination_login, &self.destination_password),
        )
    }
}

fn default_executable() -> String {
    "docker".to_string()
}

fn default_source_include() -> String {
    ".*".to_string()
}

/// Field names of [`AppConfig`].
const APP_KEYS: [&str; 10] = [
    "executable",
    "source_url",
    "source_login",
    "source_password",
    "source_include",
    "destination_url",
    "destination_login",
    "destination_password",
    "cleanup_on_failure",
    "timeout",
];

/// Maps `sourceUrl`, `SOURCEURL`, `source-url` and the like to `source_url`.
/// Unknown keys are returned unchanged.
fn canonical_key(key: &str) -> String {
    let folded: String = key
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect();
    APP_KEYS
        .iter()
        .find(|name| name.replace('_', "") == folded)
        .map_or_else(|| key.to_string(), |name| name.to_string())
}

/// A registry address together with the credentials forwarded to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEndpoint {
    /// Registry address as configured, e.g. `registry.example.com:5000`.
    pub url: String,
    pub credentials: Credentials,
}

impl RegistryEndpoint {
    pub fn new(url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            url: url.into(),
            credentials,
        }
    }
}
