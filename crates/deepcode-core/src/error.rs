//! Error types for DeepCode

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeepCodeError {
    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    #[error("GitHub credentials are missing in the `{path}` file")]
    CredentialsMissing { path: PathBuf },

    // Extraction errors
    #[error("Metadata extraction failed: {0}")]
    Extraction(String),

    // Storage-access errors
    #[error(
        "Failed to open dataset with ID '{dataset_id}'. Tried configurations: {tried}. Last error: {last_error}"
    )]
    DatasetUnavailable {
        dataset_id: String,
        tried: String,
        last_error: String,
    },

    #[error("Storage access failed with configuration '{configuration}': {reason}")]
    StorageAccess { configuration: String, reason: String },

    // Catalog building errors
    #[error("OSC Extension validation failed: Missing required fields: {}", missing.join(", "))]
    Validation { missing: Vec<String> },

    #[error("No GCMD keyword URL available for variable '{variable_id}'")]
    MissingGcmdKeyword { variable_id: String },

    #[error("Catalog document {path} is invalid: {reason}")]
    Catalog { path: String, reason: String },

    // External-process errors
    #[error("Failed to {operation}: {message}")]
    ExternalProcess { operation: String, message: String },

    #[error("GitHub API request to {operation} failed: {message}")]
    GitHubApi { operation: String, message: String },

    // Serialization errors
    #[error("JSON serialization failed: {0}")]
    Serialization(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DeepCodeError {
    pub fn config_missing(key: impl Into<String>) -> Self {
        Self::ConfigMissing { key: key.into() }
    }

    pub fn external(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalProcess {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DeepCodeError>;
