//! Config command implementation

use crate::cli::ConfigArgs;
use crate::config_loader::load_settings;
use crate::output::OutputWriter;
use crate::output_types::SettingRow;
use anyhow::Result;
use deepcode_core::config::CliSettingsOverrides;

pub fn execute(args: ConfigArgs, output: &OutputWriter) -> Result<()> {
    let settings = load_settings(CliSettingsOverrides {
        environment: args.environment,
        gitaccess_path: None,
    })?;

    let rows: Vec<SettingRow> = settings
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| SettingRow::new(key, value, source))
        .collect();

    output.section("Effective Settings");
    output.table(&rows)?;
    if !output.is_json() {
        output.kv(
            "Metadata repository",
            settings.environment.value.repository_name(),
        );
    }
    Ok(())
}
