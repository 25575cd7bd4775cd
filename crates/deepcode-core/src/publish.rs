//! Orchestrates one publication: build every document, then write or submit them together

use chrono::{DateTime, Utc};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::builder::{DatasetStacGenerator, GcmdKeywordResolver, ProductOptions};
use crate::constants::{paths, EXPERIMENT_BASE_CATALOG_SELF_HREF, WORKFLOW_BASE_CATALOG_SELF_HREF};
use crate::error::{DeepCodeError, Result};
use crate::linker::CatalogLinker;
use crate::models::{DatasetConfig, WorkflowConfig};
use crate::ports::{
    repository_path, stage_document, CatalogSource, ChangeSubmitter, FileMap, PullRequestDraft,
};
use crate::records::{normalize_workflow_id, WorkflowRecordGenerator};
use crate::storage::{open_dataset, DatasetOpener, StorageConfig};

/// Progress of a publish invocation, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStage {
    ConfigLoaded,
    DatasetBuilt,
    VariablesLinked,
    BaseCatalogsLinked,
    RecordsBuilt,
    FilesStaged,
    Committed,
    WriteOnlyMode,
}

impl fmt::Display for PublishStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PublishStage::ConfigLoaded => "config loaded",
            PublishStage::DatasetBuilt => "dataset built",
            PublishStage::VariablesLinked => "variables linked",
            PublishStage::BaseCatalogsLinked => "base catalogs linked",
            PublishStage::RecordsBuilt => "records built",
            PublishStage::FilesStaged => "files staged",
            PublishStage::Committed => "committed",
            PublishStage::WriteOnlyMode => "written to disk",
        };
        f.write_str(name)
    }
}

fn enter(stage: PublishStage) {
    tracing::info!(%stage, "Publish stage reached");
}

/// Collaborators a publication needs
pub struct PublishContext<'a> {
    pub source: &'a dyn CatalogSource,
    pub opener: &'a dyn DatasetOpener,
    pub storage_configs: Vec<StorageConfig>,
    pub resolver: &'a dyn GcmdKeywordResolver,
}

/// How staged documents leave the process
pub enum PublishMode<'a> {
    /// Write every document under `output_dir`, no repository interaction
    WriteToDisk { output_dir: PathBuf },
    /// Hand every document to a submitter as one change
    PullRequest(&'a dyn ChangeSubmitter),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Written { paths: Vec<PathBuf> },
    PullRequest { url: String, files: Vec<String> },
}

/// Publishes one dataset together with its workflow and experiment
pub struct Publisher<'a> {
    dataset_config: DatasetConfig,
    workflow_config: WorkflowConfig,
    context: PublishContext<'a>,
    generated_at: DateTime<Utc>,
}

impl<'a> Publisher<'a> {
    pub fn new(
        dataset_config: DatasetConfig,
        workflow_config: WorkflowConfig,
        context: PublishContext<'a>,
    ) -> Result<Self> {
        dataset_config.collection_id()?;
        enter(PublishStage::ConfigLoaded);
        Ok(Self {
            dataset_config,
            workflow_config,
            context,
            generated_at: Utc::now(),
        })
    }

    pub fn from_files(
        dataset_config_path: impl AsRef<Path>,
        workflow_config_path: impl AsRef<Path>,
        context: PublishContext<'a>,
    ) -> Result<Self> {
        let dataset_config = DatasetConfig::load(dataset_config_path)?;
        let workflow_config = WorkflowConfig::load(workflow_config_path)?;
        Self::new(dataset_config, workflow_config, context)
    }

    /// Stamp every generated document with a fixed instant
    pub fn with_timestamp(mut self, instant: DateTime<Utc>) -> Self {
        self.generated_at = instant;
        self
    }

    pub fn collection_id(&self) -> Result<&str> {
        self.dataset_config.collection_id()
    }

    /// Product collection, variable catalogs and the patched product, variable and project catalogs
    pub fn publish_dataset(&self) -> Result<FileMap> {
        let options = ProductOptions::from_config(&self.dataset_config)?;
        tracing::info!("Generating STAC collection...");

        let dataset = open_dataset(
            self.context.opener,
            &options.dataset_id,
            &self.context.storage_configs,
        )?;
        let linker = CatalogLinker::new(options.collection_id.clone(), &options.themes)
            .with_timestamp(self.generated_at);
        let generator = DatasetStacGenerator::new(options, dataset).with_timestamp(self.generated_at);
        let collection_id = generator.options().collection_id.clone();

        let variable_ids = generator.variable_ids();
        let collection = generator.build_dataset_collection()?;
        enter(PublishStage::DatasetBuilt);

        let mut files = FileMap::new();
        stage_document(&mut files, paths::product_collection(&collection_id), &collection)?;

        for variable_id in &variable_ids {
            let catalog = linker.variable_catalog(
                self.context.source,
                &generator,
                variable_id,
                self.context.resolver,
            )?;
            files.insert(paths::variable_catalog(variable_id), catalog.to_value()?);
        }
        enter(PublishStage::VariablesLinked);

        let source = self.context.source;
        let variable_base = linker.link_variable_base(
            source.read_document(paths::VARIABLE_BASE_CATALOG)?,
            &variable_ids,
        );
        files.insert(paths::VARIABLE_BASE_CATALOG.to_string(), variable_base.to_value()?);

        let product_base = linker.link_product_base(source.read_document(paths::PRODUCT_BASE_CATALOG)?);
        files.insert(paths::PRODUCT_BASE_CATALOG.to_string(), product_base.to_value()?);

        let project = linker.link_project_collection(source.read_document(paths::PROJECT_COLLECTION)?);
        files.insert(paths::PROJECT_COLLECTION.to_string(), project.to_value()?);
        enter(PublishStage::BaseCatalogsLinked);

        Ok(files)
    }

    /// Workflow and experiment records plus the patched experiments and workflows catalogs
    pub fn publish_workflow_experiment(&self) -> Result<FileMap> {
        let collection_id = self.collection_id()?;
        let workflow_id = normalize_workflow_id(self.workflow_config.workflow_id()?);
        let title = self.workflow_config.title();

        tracing::info!("Generating OGC API Record for the workflow...");
        let (workflow, experiment) = WorkflowRecordGenerator::new()
            .with_timestamp(self.generated_at)
            .build_records(&self.workflow_config, collection_id)?;

        let mut files = FileMap::new();
        stage_document(&mut files, paths::workflow_record(&workflow_id), &workflow)?;
        stage_document(&mut files, paths::experiment_record(&workflow_id), &experiment)?;
        enter(PublishStage::RecordsBuilt);

        let source = self.context.source;
        let experiments = CatalogLinker::link_record_base(
            source.read_document(paths::EXPERIMENT_BASE_CATALOG)?,
            &workflow_id,
            title,
            EXPERIMENT_BASE_CATALOG_SELF_HREF,
        );
        files.insert(paths::EXPERIMENT_BASE_CATALOG.to_string(), experiments.to_value()?);

        let workflows = CatalogLinker::link_record_base(
            source.read_document(paths::WORKFLOW_BASE_CATALOG)?,
            &workflow_id,
            title,
            WORKFLOW_BASE_CATALOG_SELF_HREF,
        );
        files.insert(paths::WORKFLOW_BASE_CATALOG.to_string(), workflows.to_value()?);

        Ok(files)
    }

    /// Both legs combined; fails without side effects if either leg fails
    pub fn build_all(&self) -> Result<FileMap> {
        let mut files = self.publish_dataset()?;
        files.extend(self.publish_workflow_experiment()?);
        for path in files.keys() {
            repository_path(Path::new(""), path)?;
        }
        enter(PublishStage::FilesStaged);
        Ok(files)
    }

    pub fn pull_request_draft(&self) -> Result<PullRequestDraft> {
        Ok(PullRequestDraft::for_publication(
            self.collection_id()?,
            self.workflow_config.workflow_id()?,
            self.generated_at,
        ))
    }

    pub fn publish_all(&self, mode: PublishMode<'_>) -> Result<PublishOutcome> {
        let files = self.build_all()?;

        match mode {
            PublishMode::WriteToDisk { output_dir } => {
                let paths = write_file_map(&output_dir, &files)?;
                enter(PublishStage::WriteOnlyMode);
                Ok(PublishOutcome::Written { paths })
            }
            PublishMode::PullRequest(submitter) => {
                let request = self.pull_request_draft()?;
                let url = submitter.submit(&request, &files)?;
                enter(PublishStage::Committed);
                tracing::info!("Pull request created: {}", url);
                Ok(PublishOutcome::PullRequest {
                    url,
                    files: files.keys().cloned().collect(),
                })
            }
        }
    }
}

/// Write each document as pretty JSON below `root`, creating parent directories
pub fn write_file_map(root: &Path, files: &FileMap) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(files.len());
    for (relative, document) in files {
        let target = repository_path(root, relative)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(document)
            .map_err(|e| DeepCodeError::Serialization(e.to_string()))?;
        fs::write(&target, content)?;
        tracing::debug!("Wrote {}", target.display());
        written.push(target);
    }
    Ok(written)
}
