//! User-supplied YAML inputs: dataset config, workflow config, and credentials

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;

use super::stac::Link;
use crate::error::{DeepCodeError, Result};

/// Publication status of a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetStatus {
    Ongoing,
    Completed,
    Planned,
}

impl DatasetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetStatus::Ongoing => "ongoing",
            DatasetStatus::Completed => "completed",
            DatasetStatus::Planned => "planned",
        }
    }
}

impl fmt::Display for DatasetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contents of `dataset_config.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub dataset_id: Option<String>,
    pub collection_id: Option<String>,
    pub access_link: Option<String>,
    pub documentation_link: Option<String>,
    pub dataset_status: Option<DatasetStatus>,
    pub osc_region: Option<String>,
    #[serde(default)]
    pub osc_themes: Vec<String>,
    #[serde(default)]
    pub osc_missions: Vec<String>,
    pub cf_parameter: Option<Vec<Value>>,
}

impl DatasetConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_yaml(path.as_ref())
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        parse_yaml(content, "dataset config")
    }

    pub fn dataset_id(&self) -> Result<&str> {
        required(self.dataset_id.as_deref(), "dataset_id")
    }

    pub fn collection_id(&self) -> Result<&str> {
        required(self.collection_id.as_deref(), "collection_id")
    }
}

/// Kernel the workflow notebook runs in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JupyterKernelInfo {
    pub name: Option<String>,
    /// Kept as written so `3.11` stays a number in the record
    pub python_version: Option<Value>,
    pub env_file: Option<String>,
}

/// The `properties` block of `workflow_config.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowProperties {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub themes: Vec<String>,
    pub license: Option<String>,
    pub jupyter_kernel_info: Option<JupyterKernelInfo>,
    #[serde(rename = "type")]
    pub record_type: Option<String>,
    pub osc_project: Option<String>,
    #[serde(default)]
    pub formats: Vec<Value>,
}

/// A contact entry as written in the workflow config
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactConfig {
    pub name: Option<String>,
    pub organization: Option<String>,
    pub position: Option<String>,
    #[serde(default)]
    pub links: Vec<Value>,
    #[serde(rename = "contactInstructions")]
    pub contact_instructions: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Contents of `workflow_config.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub workflow_id: Option<String>,
    #[serde(default)]
    pub properties: WorkflowProperties,
    pub jupyter_notebook_url: Option<String>,
    #[serde(default)]
    pub contact: Vec<ContactConfig>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl WorkflowConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_yaml(path.as_ref())
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        parse_yaml(content, "workflow config")
    }

    pub fn workflow_id(&self) -> Result<&str> {
        required(self.workflow_id.as_deref(), "workflow_id")
    }

    pub fn title(&self) -> Option<&str> {
        self.properties.title.as_deref()
    }
}

/// GitHub credentials read from the `.gitaccess` file
#[derive(Clone, Deserialize)]
pub struct GitCredentials {
    #[serde(rename = "github-username")]
    pub username: Option<String>,
    #[serde(rename = "github-token")]
    pub token: Option<String>,
}

impl fmt::Debug for GitCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitCredentials")
            .field("username", &self.username)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl GitCredentials {
    /// Load credentials, failing unless both username and token are present
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let missing = || DeepCodeError::CredentialsMissing {
            path: path.to_path_buf(),
        };

        let content = fs::read_to_string(path).map_err(|_| missing())?;
        let credentials: GitCredentials = if content.trim().is_empty() {
            return Err(missing());
        } else {
            serde_yaml::from_str(&content).map_err(|_| missing())?
        };

        let complete = credentials.username.as_deref().is_some_and(|u| !u.is_empty())
            && credentials.token.as_deref().is_some_and(|t| !t.is_empty());
        if !complete {
            return Err(missing());
        }
        Ok(credentials)
    }

    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or_default()
    }

    pub fn token(&self) -> &str {
        self.token.as_deref().unwrap_or_default()
    }
}

fn required<'a>(value: Option<&'a str>, key: &str) -> Result<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DeepCodeError::config_missing(key))
}

fn load_yaml<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| DeepCodeError::ConfigInvalid {
        key: path.display().to_string(),
        reason: format!("Failed to read config file: {}", e),
    })?;
    parse_yaml(&content, &path.display().to_string())
}

fn parse_yaml<T: DeserializeOwned + Default>(content: &str, origin: &str) -> Result<T> {
    if content.trim().is_empty() {
        return Ok(T::default());
    }
    serde_yaml::from_str(content).map_err(|e| DeepCodeError::ConfigInvalid {
        key: origin.to_string(),
        reason: format!("Failed to parse YAML: {}", e),
    })
}
