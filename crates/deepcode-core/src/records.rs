//! Workflow and experiment OGC API Records

use chrono::{DateTime, Utc};

use crate::builder::{product_link, project_link, root_link};
use crate::constants::{paths, BASE_URL_OSC, PROJECT_COLLECTION_NAME};
use crate::error::{DeepCodeError, Result};
use crate::models::record::{record_conformance, DEFAULT_CONTACT_ROLE};
use crate::models::{
    Contact, ContactConfig, ExperimentRecord, Link, RecordProperties, Theme, WorkflowConfig,
    WorkflowProperties, WorkflowRecord,
};
use crate::osc;

const YAML_MEDIA_TYPE: &str = "application/yaml";

/// Lowercase, with spaces turned into hyphens
pub fn normalize_workflow_id(workflow_id: &str) -> String {
    workflow_id.replace(' ', "-").to_lowercase()
}

/// Builds the shared record properties of a workflow
#[derive(Debug, Clone)]
pub struct WorkflowRecordGenerator {
    generated_at: DateTime<Utc>,
}

impl Default for WorkflowRecordGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowRecordGenerator {
    pub fn new() -> Self {
        Self {
            generated_at: Utc::now(),
        }
    }

    pub fn with_timestamp(mut self, instant: DateTime<Utc>) -> Self {
        self.generated_at = instant;
        self
    }

    pub fn build_contact_objects(contacts: &[ContactConfig]) -> Result<Vec<Contact>> {
        contacts
            .iter()
            .enumerate()
            .map(|(index, contact)| {
                let field = |value: &Option<String>, name: &str| {
                    value
                        .clone()
                        .ok_or_else(|| DeepCodeError::config_missing(format!("contact[{index}].{name}")))
                };
                let roles = if contact.roles.is_empty() {
                    vec![DEFAULT_CONTACT_ROLE.to_string()]
                } else {
                    contact.roles.clone()
                };

                Ok(Contact {
                    name: field(&contact.name, "name")?,
                    organization: field(&contact.organization, "organization")?,
                    position: contact.position.clone().unwrap_or_default(),
                    links: contact.links.clone(),
                    contact_instructions: contact.contact_instructions.clone().unwrap_or_default(),
                    roles,
                })
            })
            .collect()
    }

    pub fn build_theme(themes: &[String]) -> Theme {
        osc::build_theme(themes)
    }

    /// Workflow-side properties; `osc:workflow` is left unset
    pub fn build_record_properties(
        &self,
        properties: &WorkflowProperties,
        contacts: &[ContactConfig],
    ) -> Result<RecordProperties> {
        let now = osc::iso_timestamp(&self.generated_at);
        let themes = if properties.themes.is_empty() {
            Vec::new()
        } else {
            vec![Self::build_theme(&properties.themes)]
        };

        Ok(RecordProperties {
            created: now.clone(),
            updated: now,
            record_type: properties
                .record_type
                .clone()
                .unwrap_or_else(|| "workflow".to_string()),
            title: properties.title.clone(),
            description: properties.description.clone(),
            jupyter_kernel_info: properties.jupyter_kernel_info.clone(),
            osc_project: Some(
                properties
                    .osc_project
                    .clone()
                    .unwrap_or_else(|| PROJECT_COLLECTION_NAME.to_string()),
            ),
            osc_workflow: None,
            keywords: properties.keywords.clone(),
            contacts: Self::build_contact_objects(contacts)?,
            themes,
            formats: properties.formats.clone(),
            license: properties.license.clone(),
        })
    }

    /// Paired workflow and experiment records for a workflow config
    pub fn build_records(
        &self,
        config: &WorkflowConfig,
        collection_id: &str,
    ) -> Result<(WorkflowRecord, ExperimentRecord)> {
        let workflow_id = normalize_workflow_id(config.workflow_id()?);
        let title = config.title().map(str::to_string);

        let workflow_properties = self.build_record_properties(&config.properties, &config.contact)?;
        let experiment_properties = experiment_properties(&workflow_properties, &workflow_id);

        let mut extra_links = LinksBuilder::new(&config.properties.themes).build_theme_links_for_records();
        extra_links.extend(config.links.iter().cloned());

        let workflow = WorkflowRecord::new(
            workflow_id.clone(),
            title.clone(),
            config.jupyter_notebook_url.clone(),
            workflow_properties,
            config.properties.themes.clone(),
            extra_links.clone(),
        );
        let experiment = ExperimentRecord::new(
            workflow_id,
            title,
            config.jupyter_notebook_url.clone(),
            collection_id.to_string(),
            experiment_properties,
            extra_links,
        );

        Ok((workflow, experiment))
    }
}

/// Experiment-side copy: typed `experiment`, linked to the workflow, without `osc:project`
pub fn experiment_properties(workflow: &RecordProperties, workflow_id: &str) -> RecordProperties {
    let mut properties = workflow.clone();
    properties.record_type = "experiment".to_string();
    properties.osc_workflow = Some(workflow_id.to_string());
    properties.osc_project = None;
    properties
}

/// Theme and dataset links shared by records
#[derive(Debug, Clone)]
pub struct LinksBuilder {
    themes: Vec<String>,
}

impl LinksBuilder {
    pub fn new(themes: &[String]) -> Self {
        Self {
            themes: themes.to_vec(),
        }
    }

    pub fn build_theme_links_for_records(&self) -> Vec<Link> {
        self.themes
            .iter()
            .map(|theme| {
                Link::json("related", format!("../../themes/{theme}/catalog.json"))
                    .with_title(format!("Theme: {}", osc::capitalize(theme)))
            })
            .collect()
    }

    pub fn build_link_to_dataset(collection_id: &str) -> Vec<Link> {
        vec![product_link(collection_id)]
    }
}

impl WorkflowRecord {
    pub fn new(
        id: String,
        title: Option<String>,
        jupyter_notebook_url: Option<String>,
        properties: RecordProperties,
        themes: Vec<String>,
        links: Vec<Link>,
    ) -> Self {
        let mut record = Self {
            id,
            record_type: "Feature",
            title,
            geometry: None,
            properties,
            link_templates: Vec::new(),
            conforms_to: record_conformance(),
            themes,
            links: Vec::new(),
            jupyter_notebook_url,
        };
        record.links = record.static_links();
        record.links.extend(links);
        record
    }

    fn static_links(&self) -> Vec<Link> {
        let mut links = vec![
            root_link(),
            Link::json("parent", "../catalog.json").with_title("Workflows"),
            Link::json("child", format!("../../experiments/{}/record.json", self.id))
                .with_title(self.title.clone().unwrap_or_default()),
        ];
        if let Some(url) = &self.jupyter_notebook_url {
            links.push(Link::json("jupyter-notebook", url).with_title("Jupyter Notebook"));
        }
        links.push(project_link());
        links.push(Link::json(
            "self",
            format!("{BASE_URL_OSC}/{}", paths::workflow_record(&self.id)),
        ));
        links
    }
}

impl ExperimentRecord {
    pub fn new(
        id: String,
        title: Option<String>,
        jupyter_notebook_url: Option<String>,
        collection_id: String,
        properties: RecordProperties,
        links: Vec<Link>,
    ) -> Self {
        let mut record = Self {
            id,
            record_type: "Feature",
            title,
            geometry: None,
            properties,
            link_templates: Vec::new(),
            conforms_to: record_conformance(),
            links: Vec::new(),
            jupyter_notebook_url,
            collection_id,
        };
        record.links = record.static_links();
        record.links.extend(links);
        record
    }

    fn static_links(&self) -> Vec<Link> {
        let title = self.title.clone().unwrap_or_default();
        let mut links = vec![
            root_link(),
            Link::json("parent", "../catalog.json").with_title("Experiments"),
            Link::json("related", format!("../../workflows/{}/record.json", self.id))
                .with_title(format!("Workflow: {title}")),
        ];
        links.extend(LinksBuilder::build_link_to_dataset(&self.collection_id));
        links.push(project_link());
        links.push(
            Link::new("input", "./input.yaml")
                .with_type(YAML_MEDIA_TYPE)
                .with_title("Input parameters"),
        );
        links.push(
            Link::new("environment", "./environment.yaml")
                .with_type(YAML_MEDIA_TYPE)
                .with_title("Execution environment"),
        );
        links.push(Link::json(
            "self",
            format!("{BASE_URL_OSC}/{}", paths::experiment_record(&self.id)),
        ));
        links
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::OSC_THEME_SCHEME;

    fn contact(name: Option<&str>) -> ContactConfig {
        ContactConfig {
            name: name.map(str::to_string),
            organization: Some("Example Org".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_workflow_id() {
        assert_eq!(normalize_workflow_id("Test WF"), "test-wf");
        assert_eq!(normalize_workflow_id("snake_Case"), "snake_case");
    }

    #[test]
    fn test_contacts_default_role() {
        let contacts = WorkflowRecordGenerator::build_contact_objects(&[contact(Some("Jane"))]).unwrap();

        assert_eq!(contacts[0].roles, vec!["principal investigator"]);
        assert_eq!(contacts[0].position, "");
        assert_eq!(contacts[0].contact_instructions, "");
    }

    #[test]
    fn test_contact_without_name_is_rejected() {
        let err = WorkflowRecordGenerator::build_contact_objects(&[contact(None)]).unwrap_err();
        assert!(matches!(err, DeepCodeError::ConfigMissing { key } if key == "contact[0].name"));
    }

    #[test]
    fn test_record_properties_defaults() {
        let properties = WorkflowProperties {
            title: Some("T".to_string()),
            themes: vec!["land".to_string()],
            ..Default::default()
        };
        let generated = WorkflowRecordGenerator::new()
            .build_record_properties(&properties, &[])
            .unwrap();

        assert_eq!(generated.record_type, "workflow");
        assert_eq!(generated.osc_project.as_deref(), Some("deep-earth-system-data-lab"));
        assert_eq!(generated.created, generated.updated);
        assert_eq!(generated.themes[0].scheme, OSC_THEME_SCHEME);
    }

    #[test]
    fn test_theme_links_capitalize_only_first_letter() {
        let links = LinksBuilder::new(&["land-surface".to_string()]).build_theme_links_for_records();
        assert_eq!(links[0].title.as_deref(), Some("Theme: Land-surface"));
        assert_eq!(links[0].href, "../../themes/land-surface/catalog.json");
    }

    #[test]
    fn test_workflow_without_notebook_skips_notebook_link() {
        let config = WorkflowConfig {
            workflow_id: Some("Test WF".to_string()),
            properties: WorkflowProperties {
                title: Some("T".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let (workflow, experiment) = WorkflowRecordGenerator::new()
            .build_records(&config, "my-collection")
            .unwrap();

        assert!(workflow.links.iter().all(|l| l.rel != "jupyter-notebook"));
        assert_eq!(workflow.links.first().map(|l| l.rel.as_str()), Some("root"));
        assert_eq!(workflow.links.last().map(|l| l.rel.as_str()), Some("self"));
        assert_eq!(experiment.properties.osc_workflow.as_deref(), Some("test-wf"));
        assert!(experiment.properties.osc_project.is_none());
        assert_eq!(experiment.properties.record_type, "experiment");
    }

    #[test]
    fn test_config_links_are_appended_after_static_links() {
        let config = WorkflowConfig {
            workflow_id: Some("wf".to_string()),
            links: vec![Link::json("root", "../../catalog.json").with_title("My root")],
            ..Default::default()
        };
        let (workflow, experiment) = WorkflowRecordGenerator::new()
            .build_records(&config, "my-collection")
            .unwrap();

        for links in [&workflow.links, &experiment.links] {
            let roots: Vec<_> = links.iter().filter(|l| l.rel == "root").collect();
            assert_eq!(roots.len(), 2);
            assert_eq!(roots[0].title.as_deref(), Some("Open Science Catalog"));
            assert_eq!(links.last().and_then(|l| l.title.as_deref()), Some("My root"));
        }
    }
}
