//! Settings and storage resolution shared by CLI commands

use anyhow::{Context, Result};
use deepcode_core::config::{
    CliSettingsOverrides, PublishSettings, StorageCredentials, SETTINGS_FILE,
};
use deepcode_core::storage::{default_storage_configs, StorageConfig};
use std::path::Path;

/// Defaults, then `.deepcode/config.toml`, then environment, then CLI
pub fn load_settings(overrides: CliSettingsOverrides) -> Result<PublishSettings> {
    let mut settings = PublishSettings::with_defaults()
        .load_from_optional_file(SETTINGS_FILE)
        .context("Failed to load settings file")?
        .load_from_env();
    settings.update_from_cli(overrides);
    Ok(settings)
}

/// A single local configuration when `local_root` is given, else public then authenticated S3
pub fn storage_configs(settings: &PublishSettings, local_root: Option<&Path>) -> Vec<StorageConfig> {
    match local_root {
        Some(root) => vec![StorageConfig::local(root)],
        None => default_storage_configs(
            &settings.storage_root.value,
            &settings.storage_region.value,
            StorageCredentials::from_env(),
        ),
    }
}
