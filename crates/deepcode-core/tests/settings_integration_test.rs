//! Layered settings: CLI > environment > settings file > defaults

use deepcode_core::config::{
    CliSettingsOverrides, ConfigSource, Environment, PublishSettings, StorageCredentials,
    ENV_ENVIRONMENT, ENV_GITACCESS, ENV_STORAGE_BUCKET, ENV_STORAGE_KEY, ENV_STORAGE_REGION,
    ENV_STORAGE_SECRET,
};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn clear_env() {
    for key in [
        ENV_ENVIRONMENT,
        ENV_GITACCESS,
        ENV_STORAGE_BUCKET,
        ENV_STORAGE_REGION,
        ENV_STORAGE_KEY,
        ENV_STORAGE_SECRET,
    ] {
        env::remove_var(key);
    }
}

fn settings_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
environment = "testing"
gitaccess_path = "/etc/deepcode/gitaccess"
storage_root = "file-bucket"
"#
    )
    .unwrap();
    file
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env();
    env::set_var(ENV_ENVIRONMENT, "staging");
    env::set_var(ENV_STORAGE_BUCKET, "env-bucket");

    let file = settings_file();
    let settings = PublishSettings::with_defaults()
        .load_from_file(file.path())
        .unwrap()
        .load_from_env();

    assert_eq!(settings.environment.value, Environment::Staging);
    assert_eq!(settings.environment.source, ConfigSource::Environment);
    assert_eq!(settings.storage_root.value, "env-bucket");
    assert_eq!(settings.gitaccess_path.value, PathBuf::from("/etc/deepcode/gitaccess"));
    assert_eq!(settings.gitaccess_path.source, ConfigSource::File);
    assert_eq!(settings.storage_region.source, ConfigSource::Default);

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_all() {
    clear_env();
    env::set_var(ENV_ENVIRONMENT, "staging");
    env::set_var(ENV_GITACCESS, "/env/gitaccess");

    let file = settings_file();
    let mut settings = PublishSettings::with_defaults()
        .load_from_file(file.path())
        .unwrap()
        .load_from_env();
    settings.update_from_cli(CliSettingsOverrides {
        environment: Some(Environment::Production),
        gitaccess_path: Some(PathBuf::from("cli.gitaccess")),
    });

    assert_eq!(settings.environment.value, Environment::Production);
    assert_eq!(settings.environment.source, ConfigSource::Cli);
    assert_eq!(settings.gitaccess_path.value, PathBuf::from("cli.gitaccess"));

    let inspection = settings.to_inspection_map();
    assert_eq!(
        inspection["environment"],
        ("production".to_string(), ConfigSource::Cli)
    );
    assert_eq!(
        inspection["storage_root"],
        ("file-bucket".to_string(), ConfigSource::File)
    );

    clear_env();
}

#[test]
#[serial]
fn test_invalid_environment_value_is_ignored() {
    clear_env();
    env::set_var(ENV_ENVIRONMENT, "qa");
    env::set_var(ENV_STORAGE_REGION, "  ");

    let settings = PublishSettings::with_defaults().load_from_env();

    assert_eq!(settings.environment.value, Environment::Production);
    assert_eq!(settings.environment.source, ConfigSource::Default);
    assert_eq!(settings.storage_region.source, ConfigSource::Default);

    clear_env();
}

#[test]
#[serial]
fn test_storage_credentials_need_both_values() {
    clear_env();
    env::set_var(ENV_STORAGE_KEY, "key");
    assert!(StorageCredentials::from_env().is_none());

    env::set_var(ENV_STORAGE_SECRET, "s3cr3t");
    let credentials = StorageCredentials::from_env().unwrap();
    assert_eq!(credentials.access_key_id, "key");
    assert!(!format!("{:?}", credentials).contains("s3cr3t"));

    clear_env();
}
