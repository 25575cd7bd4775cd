//! OGC API Records for workflows and experiments

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::inputs::JupyterKernelInfo;
use super::stac::{Link, Linkable};
use crate::constants::OGC_API_RECORD_SPEC;

pub const DEFAULT_CONTACT_ROLE: &str = "principal investigator";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub organization: String,
    pub position: String,
    pub links: Vec<Value>,
    #[serde(rename = "contactInstructions")]
    pub contact_instructions: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeConcept {
    pub id: String,
}

/// A set of theme concepts drawn from one scheme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub concepts: Vec<ThemeConcept>,
    pub scheme: String,
}

/// Properties shared by the workflow and experiment records
///
/// `osc_project` and `osc_workflow` serialize under their `osc:` names and are
/// omitted when unset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordProperties {
    pub created: String,
    pub updated: String,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jupyter_kernel_info: Option<JupyterKernelInfo>,
    #[serde(rename = "osc:project", skip_serializing_if = "Option::is_none")]
    pub osc_project: Option<String>,
    #[serde(rename = "osc:workflow", skip_serializing_if = "Option::is_none")]
    pub osc_workflow: Option<String>,
    pub keywords: Vec<String>,
    pub contacts: Vec<Contact>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub themes: Vec<Theme>,
    pub formats: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

/// OGC API Record describing a workflow
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub geometry: Option<Value>,
    pub properties: RecordProperties,
    #[serde(rename = "linkTemplates")]
    pub link_templates: Vec<Value>,
    #[serde(rename = "conformsTo")]
    pub conforms_to: Vec<String>,
    pub themes: Vec<String>,
    pub links: Vec<Link>,

    /// Only used to derive the notebook link
    #[serde(skip)]
    pub jupyter_notebook_url: Option<String>,
}

/// OGC API Record describing one experiment run of a workflow
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub geometry: Option<Value>,
    pub properties: RecordProperties,
    #[serde(rename = "linkTemplates")]
    pub link_templates: Vec<Value>,
    #[serde(rename = "conformsTo")]
    pub conforms_to: Vec<String>,
    pub links: Vec<Link>,

    #[serde(skip)]
    pub jupyter_notebook_url: Option<String>,

    /// Product the experiment produced, used for the child link
    #[serde(skip)]
    pub collection_id: String,
}

pub(crate) fn record_conformance() -> Vec<String> {
    vec![OGC_API_RECORD_SPEC.to_string()]
}

impl Linkable for WorkflowRecord {
    fn links(&self) -> &[Link] {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Vec<Link> {
        &mut self.links
    }
}

impl Linkable for ExperimentRecord {
    fn links(&self) -> &[Link] {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Vec<Link> {
        &mut self.links
    }
}
