//! Placeholder configuration files written by `generate-config`

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DeepCodeError, Result};

pub const WORKFLOW_TEMPLATE_FILE: &str = "workflow_config.yaml";
pub const DATASET_TEMPLATE_FILE: &str = "dataset_config.yaml";

pub fn workflow_template() -> Result<String> {
    render(
        "Workflow",
        &json!({
            "workflow_id": "[A unique identifier for your workflow]",
            "properties": {
                "title": "[Human-readable title of the workflow]",
                "description": "[A concise summary of what the workflow does]",
                "keywords": ["[KEYWORD1]", "[KEYWORD2]"],
                "themes": [
                    "[Thematic area(s) of focus (e.g. land, ocean, atmosphere)]",
                    "[THEME1]",
                    "[THEME2]"
                ],
                "license": "[License type (e.g. MIT, Apache-2.0, CC-BY-4.0, proprietary)]",
                "jupyter_kernel_info": {
                    "name": "[Name of the execution environment or notebook kernel]",
                    "python_version": "[PYTHON_VERSION]",
                    "env_file": "[Link to the environment file (YAML) used to create the notebook environment]"
                }
            },
            "jupyter_notebook_url": "[Link to the source notebook (e.g. on GitHub)]",
            "contact": [{
                "name": "[Contact person's full name]",
                "organization": "[Affiliated institution or company]",
                "links": [{
                    "rel": "about",
                    "type": "text/html",
                    "href": "[ORGANIZATION_URL]"
                }]
            }]
        }),
    )
}

pub fn dataset_template() -> Result<String> {
    render(
        "Dataset",
        &json!({
            "dataset_id": "[The name of the dataset object within your S3 bucket].zarr",
            "collection_id": "[A unique identifier for the dataset collection]",
            "osc_themes": [
                "[Oceans]",
                "[Open Science theme (choose from https://opensciencedata.esa.int/themes/catalog)"
            ],
            "osc_region": "[Geographical coverage, e.g. 'global']",
            "dataset_status": "[Status of the dataset: 'ongoing', 'completed', or 'planned']",
            "documentation_link": "[Link to relevant documentation, publication, or handbook]"
        }),
    )
}

fn render(kind: &str, template: &Value) -> Result<String> {
    let body =
        serde_yaml::to_string(template).map_err(|e| DeepCodeError::Serialization(e.to_string()))?;
    Ok(format!(
        "# Complete {kind} Configuration Template\n\
         # Replace all [PLACEHOLDER] values with your actual data\n\n\
         {body}"
    ))
}

/// Write both templates into an existing directory
pub fn write_templates(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(DeepCodeError::ConfigInvalid {
            key: "output_dir".to_string(),
            reason: format!("{} is not an existing directory", dir.display()),
        });
    }

    let workflow = dir.join(WORKFLOW_TEMPLATE_FILE);
    fs::write(&workflow, workflow_template()?)?;
    let dataset = dir.join(DATASET_TEMPLATE_FILE);
    fs::write(&dataset, dataset_template()?)?;

    Ok(vec![workflow, dataset])
}
