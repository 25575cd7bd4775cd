//! Lint command implementation

use crate::cli::LintArgs;
use crate::config_loader::{load_settings, storage_configs};
use crate::errors::CliError;
use crate::output::OutputWriter;
use crate::output_types::LintRow;
use anyhow::{Context, Result};
use deepcode_core::config::CliSettingsOverrides;
use deepcode_core::lint::lint_dataset;
use deepcode_core::storage::open_dataset;
use deepcode_store::ZarrDatasetOpener;

pub fn execute(args: LintArgs, output: &OutputWriter) -> Result<()> {
    let settings = load_settings(CliSettingsOverrides::default())?;
    let configs = storage_configs(&settings, args.local_root.as_deref());

    let opener = ZarrDatasetOpener::new().context("Failed to start storage runtime")?;
    let dataset = open_dataset(&opener, &args.dataset_id, &configs)?;
    let report = lint_dataset(&dataset);

    if report.is_clean() {
        if output.is_json() {
            output.result(&report)?;
        } else {
            output.success(format!("{}: no issues found", args.dataset_id));
        }
        return Ok(());
    }

    let rows: Vec<LintRow> = report
        .issues
        .iter()
        .map(|issue| LintRow {
            rule: issue.rule.to_string(),
            variable: issue.variable.clone().unwrap_or_else(|| "-".to_string()),
            message: issue.message.clone(),
        })
        .collect();
    output.table(&rows)?;

    Err(CliError::new(format!(
        "{} lint issue(s) in {}",
        report.error_count(),
        args.dataset_id
    ))
    .with_suggestion("Add the missing attributes to the dataset and run lint again")
    .into())
}
