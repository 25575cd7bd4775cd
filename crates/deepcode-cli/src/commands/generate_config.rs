//! Generate-config command implementation

use crate::cli::GenerateConfigArgs;
use crate::dry_run::{display_planned_actions, ActionType, PlannedAction};
use crate::output::OutputWriter;
use crate::output_types::GenerateConfigOutput;
use anyhow::{Context, Result};
use deepcode_core::templates::{write_templates, DATASET_TEMPLATE_FILE, WORKFLOW_TEMPLATE_FILE};

pub fn execute(args: GenerateConfigArgs, output: &OutputWriter, dry_run: bool) -> Result<()> {
    if dry_run {
        let actions: Vec<PlannedAction> = [WORKFLOW_TEMPLATE_FILE, DATASET_TEMPLATE_FILE]
            .iter()
            .map(|name| {
                PlannedAction::new(
                    ActionType::WriteFile,
                    format!("Write {}", args.output_dir.join(name).display()),
                )
            })
            .collect();
        return display_planned_actions(output, &actions);
    }

    let written = write_templates(&args.output_dir).with_context(|| {
        format!("Failed to write templates to {}", args.output_dir.display())
    })?;

    let files: Vec<String> = written.iter().map(|p| p.display().to_string()).collect();
    if output.is_json() {
        output.result(GenerateConfigOutput { files })?;
    } else {
        for file in &files {
            output.success(format!("Template written to {}", file));
        }
        output.info("Fill in the templates, then run: deep-code publish <dataset_config> <workflow_config>");
    }
    Ok(())
}
