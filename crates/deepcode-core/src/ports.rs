//! Boundaries to the metadata repository and the change-submission workflow

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::constants::OSC_BRANCH_NAME;
use crate::error::{DeepCodeError, Result};
use crate::models::StacDocument;

/// Documents to publish, keyed by repository-relative path
pub type FileMap = BTreeMap<String, Value>;

/// Join a repository-relative path onto `root`, rejecting anything that would leave it
pub fn repository_path(root: &Path, relative: &str) -> Result<PathBuf> {
    let relative_path = Path::new(relative);
    let contained = !relative.is_empty()
        && relative_path
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
    if !contained {
        return Err(DeepCodeError::ConfigInvalid {
            key: relative.to_string(),
            reason: "output path must stay inside the repository".to_string(),
        });
    }
    Ok(root.join(relative_path))
}

/// Serialize a document and stage it under `path`
pub fn stage_document<T: Serialize>(files: &mut FileMap, path: impl Into<String>, document: &T) -> Result<()> {
    let value =
        serde_json::to_value(document).map_err(|e| DeepCodeError::Serialization(e.to_string()))?;
    files.insert(path.into(), value);
    Ok(())
}

/// Read access to the current state of the metadata repository
pub trait CatalogSource {
    fn exists(&self, path: &str) -> bool;

    fn read_document(&self, path: &str) -> Result<StacDocument>;
}

/// A metadata repository checked out on the local file system
#[derive(Debug, Clone)]
pub struct LocalCatalogSource {
    root: PathBuf,
}

impl LocalCatalogSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl CatalogSource for LocalCatalogSource {
    fn exists(&self, path: &str) -> bool {
        let exists = repository_path(&self.root, path).is_ok_and(|file| file.is_file());
        tracing::debug!("Checking existence of {}: {}", path, exists);
        exists
    }

    fn read_document(&self, path: &str) -> Result<StacDocument> {
        read_document_file(&repository_path(&self.root, path)?, path)
    }
}

/// Parse a JSON document from disk, reporting failures against its repository path
pub fn read_document_file(file: &Path, path: &str) -> Result<StacDocument> {
    let invalid = |reason: String| DeepCodeError::Catalog {
        path: path.to_string(),
        reason,
    };
    let content = fs::read_to_string(file).map_err(|e| invalid(e.to_string()))?;
    let value: Value = serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?;
    StacDocument::from_value(value, path)
}

/// Branch, commit and pull-request texts for one publication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestDraft {
    pub branch_name: String,
    pub commit_message: String,
    pub title: String,
    pub body: String,
}

impl PullRequestDraft {
    pub fn for_publication(collection_id: &str, workflow_id: &str, now: DateTime<Utc>) -> Self {
        let summary = format!(
            "Add new dataset collection: {collection_id} and workflow/experiment: {workflow_id}"
        );
        Self {
            branch_name: format!(
                "{OSC_BRANCH_NAME}-{collection_id}-{}",
                now.format("%Y%m%d%H%M%S")
            ),
            commit_message: summary.clone(),
            title: summary,
            body: format!(
                "This PR adds a new dataset collection: {collection_id} and its corresponding \
                 workflow/experiment to the repository."
            ),
        }
    }
}

/// Turns staged documents into a reviewable change, returning its URL
pub trait ChangeSubmitter {
    fn submit(&self, request: &PullRequestDraft, files: &FileMap) -> Result<String>;
}
