//! Pull-request publication against a temporary clone of the metadata repository

use std::path::Path;
use tempfile::TempDir;
use tracing::info;

use deepcode_core::config::Environment;
use deepcode_core::constants::OSC_REPO_OWNER;
use deepcode_core::error::Result;
use deepcode_core::models::{GitCredentials, StacDocument};
use deepcode_core::ports::{CatalogSource, ChangeSubmitter, FileMap, LocalCatalogSource, PullRequestDraft};

use crate::automation::GitHubAutomation;

const BASE_BRANCH: &str = "main";

/// Fork + clone established at construction; the clone lives in a
/// temporary directory removed when the publisher is dropped
#[derive(Debug)]
pub struct GitHubPublisher {
    automation: GitHubAutomation,
    catalog: LocalCatalogSource,
    // Dropped last
    _workspace: TempDir,
}

impl GitHubPublisher {
    /// Fork the environment's metadata repository and clone it
    pub fn connect(credentials: &GitCredentials, environment: Environment) -> Result<Self> {
        let repo_name = environment.repository_name();
        let workspace = TempDir::new()?;
        let automation = GitHubAutomation::new(
            credentials.username(),
            credentials.token(),
            OSC_REPO_OWNER,
            repo_name.as_str(),
            workspace.path().join(&repo_name),
        );

        automation.fork_repository()?;
        automation.clone_sync_repository()?;
        Ok(Self::with_workspace(automation, workspace))
    }

    /// Wrap an automation whose clone directory lives inside `workspace`
    pub fn with_workspace(automation: GitHubAutomation, workspace: TempDir) -> Self {
        let catalog = LocalCatalogSource::new(automation.clone_dir());
        Self {
            automation,
            catalog,
            _workspace: workspace,
        }
    }

    pub fn clone_dir(&self) -> &Path {
        self.automation.clone_dir()
    }

    /// Branch, add every file, commit, push and open the pull request
    pub fn publish_files(&self, request: &PullRequestDraft, files: &FileMap) -> Result<String> {
        self.automation.create_branch(&request.branch_name)?;

        for (file_path, content) in files {
            self.automation.add_file(file_path, content)?;
        }

        self.automation
            .commit_and_push(&request.branch_name, &request.commit_message)?;
        self.automation.create_pull_request(
            &request.branch_name,
            &request.title,
            &request.body,
            BASE_BRANCH,
        )
    }
}

impl CatalogSource for GitHubPublisher {
    fn exists(&self, path: &str) -> bool {
        self.automation.file_exists(path)
    }

    fn read_document(&self, path: &str) -> Result<StacDocument> {
        self.catalog.read_document(path)
    }
}

impl ChangeSubmitter for GitHubPublisher {
    fn submit(&self, request: &PullRequestDraft, files: &FileMap) -> Result<String> {
        self.publish_files(request, files)
    }
}

impl Drop for GitHubPublisher {
    fn drop(&mut self) {
        info!("Cleaning up local repository...");
    }
}
