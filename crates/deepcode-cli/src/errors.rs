use console::style;
use deepcode_core::DeepCodeError;
use std::fmt;

/// Error with suggestions for the user
#[derive(Clone)]
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn credentials_missing(path: &str) -> CliError {
    CliError::new("GitHub credentials are missing")
        .with_context(format!(
            "Publishing opens a pull request and needs a credentials file.\n\nLooked for: {}",
            path
        ))
        .with_suggestion("Create the file with two keys:\n     github-username: <user>\n     github-token: <personal access token>")
        .with_suggestion("Or point to it with --gitaccess or DEEPCODE_GITACCESS")
        .with_suggestion("Or publish locally with --write-to-disk <REPO_DIR>")
        .with_help("Run: deep-code publish --help")
}

pub fn config_missing(key: &str) -> CliError {
    CliError::new(format!("Missing configuration key: {}", key))
        .with_context(format!("The configuration file does not define '{}'.", key))
        .with_suggestion("Generate annotated templates: deep-code generate-config")
        .with_help("Run: deep-code generate-config --help")
}

pub fn dataset_unavailable(error: &DeepCodeError) -> CliError {
    CliError::new("Dataset could not be opened")
        .with_context(error.to_string())
        .with_suggestion("Check the dataset_id in the dataset configuration")
        .with_suggestion("Set S3_USER_STORAGE_KEY and S3_USER_STORAGE_SECRET for private stores")
        .with_suggestion("Or open a local copy with --local-root <DIR>")
}

pub fn missing_gcmd_keyword(variable_id: &str) -> CliError {
    CliError::new(format!("Variable '{}' has no GCMD keyword URL", variable_id))
        .with_context("Every published variable needs a 'gcmd_keyword_url' attribute.")
        .with_suggestion("Add the attribute to the variable in the dataset")
        .with_suggestion("Or pass --gcmd-default <URL> or --interactive")
        .with_help("Run: deep-code lint <dataset_id>")
}

/// Map an error chain to guidance for the well-known failures
pub fn from_anyhow(error: anyhow::Error) -> CliError {
    if let Some(cli_error) = error.downcast_ref::<CliError>() {
        return cli_error.clone();
    }

    match error.chain().find_map(|cause| cause.downcast_ref::<DeepCodeError>()) {
        Some(DeepCodeError::CredentialsMissing { path }) => {
            credentials_missing(&path.display().to_string())
        }
        Some(DeepCodeError::ConfigMissing { key }) => config_missing(key),
        Some(e @ DeepCodeError::DatasetUnavailable { .. }) => dataset_unavailable(e),
        Some(DeepCodeError::MissingGcmdKeyword { variable_id }) => missing_gcmd_keyword(variable_id),
        _ => CliError::new(format!("{:#}", error)),
    }
}
