use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

use deepcode_core::error::{DeepCodeError, Result};
use deepcode_core::ports::repository_path;

pub const GITHUB_API_URL: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("deep-code/", env!("CARGO_PKG_VERSION"));

/// Git and GitHub operations against one fork of the metadata repository
pub struct GitHubAutomation {
    username: String,
    token: String,
    repo_owner: String,
    repo_name: String,
    api_url: String,
    /// Local clone of the fork
    clone_dir: PathBuf,
    client: reqwest::Client,
}

impl GitHubAutomation {
    pub fn new(
        username: impl Into<String>,
        token: impl Into<String>,
        repo_owner: impl Into<String>,
        repo_name: impl Into<String>,
        clone_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
            repo_owner: repo_owner.into(),
            repo_name: repo_name.into(),
            api_url: GITHUB_API_URL.to_string(),
            clone_dir: clone_dir.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Point REST calls at another API root (GitHub Enterprise, test servers)
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn clone_dir(&self) -> &Path {
        &self.clone_dir
    }

    pub fn base_repo_url(&self) -> String {
        format!("https://github.com/{}/{}.git", self.repo_owner, self.repo_name)
    }

    /// Authenticated remote of the user's fork; never log this value
    fn fork_repo_url(&self) -> String {
        format!(
            "https://{}:{}@github.com/{}/{}.git",
            self.username, self.token, self.username, self.repo_name
        )
    }

    /// Fork the metadata repository into the user's account
    pub fn fork_repository(&self) -> Result<()> {
        info!("Forking repository {}/{}...", self.repo_owner, self.repo_name);
        let url = format!(
            "{}/repos/{}/{}/forks",
            self.api_url, self.repo_owner, self.repo_name
        );
        self.post_json::<Value, _>("fork repository", &url, &serde_json::json!({}))?;
        info!("Repository forked to {}/{}", self.username, self.repo_name);
        Ok(())
    }

    /// Clone the fork when no local copy exists, otherwise pull
    pub fn clone_sync_repository(&self) -> Result<()> {
        if is_empty_dir(&self.clone_dir) {
            info!("Cloning forked repository...");
            let parent = self
                .clone_dir
                .parent()
                .ok_or_else(|| DeepCodeError::external("clone repository", "clone directory has no parent"))?;
            let target = self.clone_dir.to_string_lossy().into_owned();
            self.git_in(parent, "clone repository", &["clone", &self.fork_repo_url(), &target])?;
            info!("Repository cloned to {}", self.clone_dir.display());
        } else {
            info!("Local repository already exists. Pulling latest changes...");
            self.git("pull latest changes", &["pull"])?;
            info!("Repository updated with latest changes.");
        }
        Ok(())
    }

    pub fn create_branch(&self, branch_name: &str) -> Result<()> {
        info!("Creating new branch: {}...", branch_name);
        self.git(
            &format!("create branch '{}'", branch_name),
            &["checkout", "-b", branch_name],
        )?;
        Ok(())
    }

    /// Write `content` as pretty JSON at `file_path` and stage it
    pub fn add_file(&self, file_path: &str, content: &Value) -> Result<()> {
        info!("Adding new file: {}...", file_path);
        let full_path = repository_path(&self.clone_dir, file_path)?;
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(content)
            .map_err(|e| DeepCodeError::Serialization(e.to_string()))?;
        fs::write(&full_path, json)?;

        self.git(&format!("add file '{}'", file_path), &["add", file_path])?;
        Ok(())
    }

    pub fn commit_and_push(&self, branch_name: &str, commit_message: &str) -> Result<()> {
        info!("Committing and pushing changes...");
        self.git("commit and push", &["commit", "-m", commit_message])?;
        self.git("commit and push", &["push", "-u", "origin", branch_name])?;
        Ok(())
    }

    /// Open a pull request from the fork's branch; returns its web URL
    pub fn create_pull_request(
        &self,
        branch_name: &str,
        title: &str,
        body: &str,
        base_branch: &str,
    ) -> Result<String> {
        info!("Creating a pull request...");
        let url = format!(
            "{}/repos/{}/{}/pulls",
            self.api_url, self.repo_owner, self.repo_name
        );
        let request = PullRequestBody {
            title,
            head: self.head_ref(branch_name),
            base: base_branch,
            body,
        };
        let response: PullRequestResponse = self.post_json("create pull request", &url, &request)?;
        info!("Pull request created: {}", response.html_url);
        Ok(response.html_url)
    }

    pub fn file_exists(&self, file_path: &str) -> bool {
        let exists = repository_path(&self.clone_dir, file_path).is_ok_and(|path| path.is_file());
        debug!("Checking existence of {}: {}", file_path, exists);
        exists
    }

    fn head_ref(&self, branch_name: &str) -> String {
        format!("{}:{}", self.username, branch_name)
    }

    fn git(&self, operation: &str, args: &[&str]) -> Result<String> {
        self.git_in(&self.clone_dir, operation, args)
    }

    fn git_in(&self, dir: &Path, operation: &str, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|e| DeepCodeError::external(operation, self.redact(&e.to_string())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DeepCodeError::external(
                operation,
                format!("{} ({})", self.redact(stderr.trim()), output.status),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn post_json<T, B>(&self, operation: &str, url: &str, body: &B) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
        B: Serialize + ?Sized,
    {
        let api_error = |message: String| DeepCodeError::GitHubApi {
            operation: operation.to_string(),
            message,
        };

        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| api_error(format!("Failed to create async runtime: {}", e)))?;

        runtime.block_on(async {
            let response = self
                .client
                .post(url)
                .header(reqwest::header::AUTHORIZATION, format!("token {}", self.token))
                .header(reqwest::header::USER_AGENT, USER_AGENT)
                .header(reqwest::header::ACCEPT, "application/vnd.github+json")
                .json(body)
                .send()
                .await
                .map_err(|e| api_error(self.redact(&e.to_string())))?;

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response.text().await.unwrap_or_default();
                return Err(api_error(format!("{} {}", status, self.redact(&error_text))));
            }

            response
                .json::<T>()
                .await
                .map_err(|e| api_error(format!("Failed to parse response: {}", e)))
        })
    }

    /// Replace the token in text that may echo the authenticated remote
    fn redact(&self, text: &str) -> String {
        if self.token.is_empty() {
            text.to_string()
        } else {
            text.replace(&self.token, "***")
        }
    }
}

impl std::fmt::Debug for GitHubAutomation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubAutomation")
            .field("username", &self.username)
            .field("repo_owner", &self.repo_owner)
            .field("repo_name", &self.repo_name)
            .field("clone_dir", &self.clone_dir)
            .finish_non_exhaustive()
    }
}

fn is_empty_dir(path: &Path) -> bool {
    match fs::read_dir(path) {
        Ok(mut entries) => entries.next().is_none(),
        Err(_) => true,
    }
}

#[derive(Debug, Serialize)]
struct PullRequestBody<'a> {
    title: &'a str,
    head: String,
    base: &'a str,
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct PullRequestResponse {
    html_url: String,
}
