//! Publish command implementation

use crate::cli::PublishArgs;
use crate::config_loader::{load_settings, storage_configs};
use crate::dry_run::{display_planned_actions, ActionType, PlannedAction};
use crate::interactive::PromptGcmdKeyword;
use crate::output::OutputWriter;
use crate::output_types::{PublishModeName, PublishOutput};
use anyhow::{Context, Result};
use chrono::Utc;
use deepcode_core::builder::{DefaultGcmdKeyword, GcmdKeywordResolver, RequireGcmdKeyword};
use deepcode_core::config::{CliSettingsOverrides, PublishSettings};
use deepcode_core::models::{DatasetConfig, GitCredentials, WorkflowConfig};
use deepcode_core::ports::{LocalCatalogSource, PullRequestDraft};
use deepcode_core::publish::{PublishContext, PublishMode, PublishOutcome, Publisher};
use deepcode_github::GitHubPublisher;
use deepcode_store::ZarrDatasetOpener;
use std::path::PathBuf;

pub fn execute(args: PublishArgs, output: &OutputWriter, dry_run: bool) -> Result<()> {
    let settings = load_settings(CliSettingsOverrides {
        environment: args.environment,
        gitaccess_path: args.gitaccess.clone(),
    })?;

    // Credentials are checked before any other work when a pull request is the goal
    let target = match &args.write_to_disk {
        Some(repo_dir) => Target::Disk(repo_dir.clone()),
        None => Target::PullRequest(
            GitCredentials::load(&settings.gitaccess_path.value)
                .context("Failed to load GitHub credentials")?,
        ),
    };

    let dataset_config = DatasetConfig::load(&args.dataset_config).with_context(|| {
        format!("Failed to load dataset config {}", args.dataset_config.display())
    })?;
    let workflow_config = WorkflowConfig::load(&args.workflow_config).with_context(|| {
        format!("Failed to load workflow config {}", args.workflow_config.display())
    })?;

    let resolver = gcmd_resolver(&args);
    let opener = ZarrDatasetOpener::new().context("Failed to start storage runtime")?;
    let configs = storage_configs(&settings, args.local_root.as_deref());

    match target {
        Target::Disk(repo_dir) => {
            let output_dir = args.output_dir.clone().unwrap_or_else(|| repo_dir.clone());
            let source = LocalCatalogSource::new(&repo_dir);
            let publisher = Publisher::new(
                dataset_config,
                workflow_config,
                PublishContext {
                    source: &source,
                    opener: &opener,
                    storage_configs: configs,
                    resolver: resolver.as_ref(),
                },
            )?;

            if dry_run {
                let files = publisher.build_all()?;
                let actions: Vec<PlannedAction> = files
                    .keys()
                    .map(|path| {
                        PlannedAction::new(
                            ActionType::WriteFile,
                            format!("Write {}", output_dir.join(path).display()),
                        )
                    })
                    .collect();
                return display_planned_actions(output, &actions);
            }

            let outcome = publisher.publish_all(PublishMode::WriteToDisk { output_dir })?;
            report(output, publisher.collection_id()?, outcome)
        }
        Target::PullRequest(credentials) => {
            if dry_run {
                let request = PullRequestDraft::for_publication(
                    dataset_config.collection_id()?,
                    workflow_config.workflow_id()?,
                    Utc::now(),
                );
                return display_planned_actions(output, &pull_request_plan(&settings, &request));
            }

            output.info(format!(
                "Publishing to {}",
                settings.environment.value.repository_name()
            ));
            let github = GitHubPublisher::connect(&credentials, settings.environment.value)
                .context("Failed to prepare the metadata repository")?;
            let publisher = Publisher::new(
                dataset_config,
                workflow_config,
                PublishContext {
                    source: &github,
                    opener: &opener,
                    storage_configs: configs,
                    resolver: resolver.as_ref(),
                },
            )?;

            let outcome = publisher.publish_all(PublishMode::PullRequest(&github))?;
            report(output, publisher.collection_id()?, outcome)
        }
    }
}

enum Target {
    Disk(PathBuf),
    PullRequest(GitCredentials),
}

fn gcmd_resolver(args: &PublishArgs) -> Box<dyn GcmdKeywordResolver> {
    if args.interactive {
        Box::new(PromptGcmdKeyword)
    } else if let Some(url) = &args.gcmd_default {
        Box::new(DefaultGcmdKeyword(url.clone()))
    } else {
        Box::new(RequireGcmdKeyword)
    }
}

fn pull_request_plan(settings: &PublishSettings, request: &PullRequestDraft) -> Vec<PlannedAction> {
    let repository = settings.environment.value.repository_name();
    vec![
        PlannedAction::new(ActionType::ForkRepository, format!("Fork {}", repository)),
        PlannedAction::new(ActionType::CloneRepository, "Clone the fork into a temporary directory"),
        PlannedAction::new(ActionType::CreateBranch, format!("Create branch {}", request.branch_name)),
        PlannedAction::new(ActionType::WriteFile, "Write product, variable, workflow and experiment documents"),
        PlannedAction::new(ActionType::CommitAndPush, request.commit_message.clone()),
        PlannedAction::new(ActionType::OpenPullRequest, request.title.clone())
            .with_detail(request.body.clone()),
    ]
}

fn report(output: &OutputWriter, collection_id: &str, outcome: PublishOutcome) -> Result<()> {
    let result = match outcome {
        PublishOutcome::Written { paths } => PublishOutput {
            mode: PublishModeName::WriteToDisk,
            collection_id: collection_id.to_string(),
            files: paths.iter().map(|p| p.display().to_string()).collect(),
            pull_request_url: None,
        },
        PublishOutcome::PullRequest { url, files } => PublishOutput {
            mode: PublishModeName::PullRequest,
            collection_id: collection_id.to_string(),
            files,
            pull_request_url: Some(url),
        },
    };

    if output.is_json() {
        return output.result(result);
    }

    match &result.pull_request_url {
        Some(url) => output.success(format!("Pull request created: {}", url)),
        None => output.success(format!(
            "Wrote {} files for collection {}",
            result.files.len(),
            collection_id
        )),
    }
    for file in &result.files {
        output.info(file);
    }
    Ok(())
}
