use crate::constants::{DEFAULT_STORAGE_REGION, DEFAULT_STORAGE_ROOT, OSC_REPO_NAME};
use crate::error::{DeepCodeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const ENV_ENVIRONMENT: &str = "DEEPCODE_ENVIRONMENT";
pub const ENV_GITACCESS: &str = "DEEPCODE_GITACCESS";
pub const ENV_STORAGE_BUCKET: &str = "S3_USER_STORAGE_BUCKET";
pub const ENV_STORAGE_REGION: &str = "S3_USER_STORAGE_REGION";
pub const ENV_STORAGE_KEY: &str = "S3_USER_STORAGE_KEY";
pub const ENV_STORAGE_SECRET: &str = "S3_USER_STORAGE_SECRET";

/// Default location of the optional settings file
pub const SETTINGS_FILE: &str = ".deepcode/config.toml";

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from settings file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Target metadata repository flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Staging,
    Testing,
}

impl Environment {
    /// Name of the metadata repository this environment publishes to
    pub fn repository_name(&self) -> String {
        match self {
            Environment::Production => OSC_REPO_NAME.to_string(),
            Environment::Staging => format!("{OSC_REPO_NAME}-staging"),
            Environment::Testing => format!("{OSC_REPO_NAME}-testing"),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Production => "production",
            Environment::Staging => "staging",
            Environment::Testing => "testing",
        };
        f.write_str(name)
    }
}

impl FromStr for Environment {
    type Err = DeepCodeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "production" => Ok(Environment::Production),
            "staging" => Ok(Environment::Staging),
            "testing" => Ok(Environment::Testing),
            _ => Err(DeepCodeError::ConfigInvalid {
                key: "environment".to_string(),
                reason: format!("Invalid environment: {}. Use production, staging, or testing", s),
            }),
        }
    }
}

/// Layered runtime settings for a publish invocation
#[derive(Debug, Clone)]
pub struct PublishSettings {
    pub environment: ConfigValue<Environment>,
    pub gitaccess_path: ConfigValue<PathBuf>,
    pub storage_root: ConfigValue<String>,
    pub storage_region: ConfigValue<String>,
}

impl PublishSettings {
    /// Create settings with default values
    pub fn with_defaults() -> Self {
        Self {
            environment: ConfigValue::new(Environment::Production, ConfigSource::Default),
            gitaccess_path: ConfigValue::new(PathBuf::from(".gitaccess"), ConfigSource::Default),
            storage_root: ConfigValue::new(DEFAULT_STORAGE_ROOT.to_string(), ConfigSource::Default),
            storage_region: ConfigValue::new(
                DEFAULT_STORAGE_REGION.to_string(),
                ConfigSource::Default,
            ),
        }
    }

    /// Load settings from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| DeepCodeError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read settings file: {}", e),
            })?;

        let file_settings: FileSettings =
            toml::from_str(&content).map_err(|e| DeepCodeError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(environment) = file_settings.environment {
            self.environment.update(environment, ConfigSource::File);
        }

        if let Some(path) = file_settings.gitaccess_path {
            self.gitaccess_path.update(path, ConfigSource::File);
        }

        if let Some(root) = file_settings.storage_root {
            self.storage_root.update(root, ConfigSource::File);
        }

        if let Some(region) = file_settings.storage_region {
            self.storage_region.update(region, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load the settings file when it exists, keeping defaults otherwise
    pub fn load_from_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        if path.as_ref().is_file() {
            self.load_from_file(path)
        } else {
            tracing::debug!("No settings file at {}", path.as_ref().display());
            Ok(self)
        }
    }

    /// Load settings from environment variables
    pub fn load_from_env(mut self) -> Self {
        // DEEPCODE_ENVIRONMENT
        if let Ok(env_str) = env::var(ENV_ENVIRONMENT) {
            match env_str.parse::<Environment>() {
                Ok(environment) => self.environment.update(environment, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid {} value '{}': expected production, staging, or testing",
                    ENV_ENVIRONMENT,
                    env_str
                ),
            }
        }

        // DEEPCODE_GITACCESS
        if let Ok(path) = env::var(ENV_GITACCESS) {
            self.gitaccess_path.update(PathBuf::from(path), ConfigSource::Environment);
        }

        // S3_USER_STORAGE_BUCKET
        if let Some(bucket) = non_empty_var(ENV_STORAGE_BUCKET) {
            self.storage_root.update(bucket, ConfigSource::Environment);
        }

        // S3_USER_STORAGE_REGION
        if let Some(region) = non_empty_var(ENV_STORAGE_REGION) {
            self.storage_region.update(region, ConfigSource::Environment);
        }

        self
    }

    /// Update settings from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliSettingsOverrides) {
        if let Some(environment) = overrides.environment {
            self.environment.update(environment, ConfigSource::Cli);
        }

        if let Some(path) = overrides.gitaccess_path {
            self.gitaccess_path.update(path, ConfigSource::Cli);
        }
    }

    /// Get all settings as a map for inspection
    pub fn to_inspection_map(&self) -> BTreeMap<String, (String, ConfigSource)> {
        let mut map = BTreeMap::new();

        map.insert(
            "environment".to_string(),
            (self.environment.value.to_string(), self.environment.source),
        );
        map.insert(
            "gitaccess_path".to_string(),
            (self.gitaccess_path.value.display().to_string(), self.gitaccess_path.source),
        );
        map.insert(
            "storage_root".to_string(),
            (self.storage_root.value.clone(), self.storage_root.source),
        );
        map.insert(
            "storage_region".to_string(),
            (self.storage_region.value.clone(), self.storage_region.source),
        );

        map
    }
}

/// Settings loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileSettings {
    environment: Option<Environment>,
    gitaccess_path: Option<PathBuf>,
    storage_root: Option<String>,
    storage_region: Option<String>,
}

/// CLI settings overrides
#[derive(Debug, Default)]
pub struct CliSettingsOverrides {
    pub environment: Option<Environment>,
    pub gitaccess_path: Option<PathBuf>,
}

/// Key pair for credentialed object-store access
#[derive(Clone, PartialEq)]
pub struct StorageCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl StorageCredentials {
    /// Read `S3_USER_STORAGE_KEY` and `S3_USER_STORAGE_SECRET`, if both are set
    pub fn from_env() -> Option<Self> {
        Some(Self {
            access_key_id: non_empty_var(ENV_STORAGE_KEY)?,
            secret_access_key: non_empty_var(ENV_STORAGE_SECRET)?,
        })
    }
}

impl fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .finish()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
