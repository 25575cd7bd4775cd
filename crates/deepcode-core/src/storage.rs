//! Dataset access through an ordered chain of storage configurations

use std::fmt;
use std::path::PathBuf;

use crate::config::StorageCredentials;
use crate::error::{DeepCodeError, Result};
use crate::models::Dataset;

/// Where and how a dataset store is reached
#[derive(Debug, Clone, PartialEq)]
pub enum StorageParams {
    /// S3-compatible object store; `root` is the bucket
    S3 {
        root: String,
        region: String,
        endpoint: Option<String>,
        anonymous: bool,
        credentials: Option<StorageCredentials>,
    },
    /// Local directory containing datasets
    File { root: PathBuf },
}

/// A named storage configuration tried while opening a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct StorageConfig {
    pub description: String,
    pub params: StorageParams,
}

impl StorageConfig {
    pub fn new(description: impl Into<String>, params: StorageParams) -> Self {
        Self {
            description: description.into(),
            params,
        }
    }

    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self::new("Local store", StorageParams::File { root: root.into() })
    }
}

impl fmt::Display for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Anonymous public access first, then credentialed access
pub fn default_storage_configs(
    root: &str,
    region: &str,
    credentials: Option<StorageCredentials>,
) -> Vec<StorageConfig> {
    vec![
        StorageConfig::new(
            "Public store",
            StorageParams::S3 {
                root: root.to_string(),
                region: region.to_string(),
                endpoint: None,
                anonymous: true,
                credentials: None,
            },
        ),
        StorageConfig::new(
            "Authenticated store",
            StorageParams::S3 {
                root: root.to_string(),
                region: region.to_string(),
                endpoint: None,
                anonymous: false,
                credentials,
            },
        ),
    ]
}

/// Opens a dataset from one storage configuration
pub trait DatasetOpener {
    fn open(&self, dataset_id: &str, config: &StorageConfig) -> Result<Dataset>;
}

/// Try each configuration in order and return the first dataset that opens
pub fn open_dataset(
    opener: &dyn DatasetOpener,
    dataset_id: &str,
    configs: &[StorageConfig],
) -> Result<Dataset> {
    if configs.is_empty() {
        return Err(DeepCodeError::ConfigInvalid {
            key: "storage_configs".to_string(),
            reason: "at least one storage configuration is required".to_string(),
        });
    }

    let mut tried = Vec::with_capacity(configs.len());
    let mut last_error = String::new();

    for config in configs {
        tried.push(config.description.clone());
        tracing::info!(
            "Attempting to open dataset '{}' with configuration: {}",
            dataset_id,
            config
        );

        match opener.open(dataset_id, config) {
            Ok(dataset) => {
                tracing::info!(
                    "Successfully opened dataset '{}' with configuration: {}",
                    dataset_id,
                    config
                );
                return Ok(dataset);
            }
            Err(e) => {
                tracing::error!(
                    "Failed to open dataset '{}' with configuration: {}. Error: {}",
                    dataset_id,
                    config,
                    e
                );
                last_error = e.to_string();
            }
        }
    }

    Err(DeepCodeError::DatasetUnavailable {
        dataset_id: dataset_id.to_string(),
        tried: tried.join(", "),
        last_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct ScriptedOpener {
        succeed_on: Option<&'static str>,
        calls: RefCell<Vec<String>>,
    }

    impl DatasetOpener for ScriptedOpener {
        fn open(&self, _dataset_id: &str, config: &StorageConfig) -> Result<Dataset> {
            self.calls.borrow_mut().push(config.description.clone());
            if self.succeed_on == Some(config.description.as_str()) {
                Ok(Dataset::new().with_attr("description", "ok"))
            } else {
                Err(DeepCodeError::StorageAccess {
                    configuration: config.description.clone(),
                    reason: format!("denied by {}", config.description),
                })
            }
        }
    }

    #[test]
    fn test_falls_back_to_second_configuration() {
        let opener = ScriptedOpener {
            succeed_on: Some("Authenticated store"),
            calls: RefCell::new(Vec::new()),
        };
        let configs = default_storage_configs("bucket", "eu-central-1", None);

        let dataset = open_dataset(&opener, "cube.zarr", &configs).unwrap();

        assert_eq!(dataset.attr_str("description"), Some("ok"));
        assert_eq!(*opener.calls.borrow(), vec!["Public store", "Authenticated store"]);
    }

    #[test]
    fn test_stops_at_first_success() {
        let opener = ScriptedOpener {
            succeed_on: Some("Public store"),
            calls: RefCell::new(Vec::new()),
        };
        let configs = default_storage_configs("bucket", "eu-central-1", None);

        open_dataset(&opener, "cube.zarr", &configs).unwrap();
        assert_eq!(opener.calls.borrow().len(), 1);
    }

    #[test]
    fn test_exhaustion_names_every_configuration() {
        let opener = ScriptedOpener {
            succeed_on: None,
            calls: RefCell::new(Vec::new()),
        };
        let configs = vec![
            StorageConfig::local("/data/a"),
            StorageConfig::new("Mirror", StorageParams::File { root: "/data/b".into() }),
        ];

        let message = open_dataset(&opener, "cube.zarr", &configs).unwrap_err().to_string();

        assert!(message.contains("Failed to open dataset with ID 'cube.zarr'"));
        assert!(message.contains("Tried configurations: Local store, Mirror"));
        assert!(message.contains("denied by Mirror"));
    }

    #[test]
    fn test_empty_configuration_list_is_invalid() {
        let opener = ScriptedOpener {
            succeed_on: None,
            calls: RefCell::new(Vec::new()),
        };
        assert!(matches!(
            open_dataset(&opener, "cube.zarr", &[]),
            Err(DeepCodeError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn test_default_configs_anonymous_first() {
        let configs = default_storage_configs("deep-esdl-public", "eu-central-1", None);
        assert_eq!(configs.len(), 2);
        assert!(matches!(configs[0].params, StorageParams::S3 { anonymous: true, .. }));
        assert!(matches!(configs[1].params, StorageParams::S3 { anonymous: false, .. }));
    }
}
