use deepcode_core::config::ConfigSource;
use serde::Serialize;
use tabled::Tabled;

/// Output for publish command
#[derive(Debug, Serialize)]
pub struct PublishOutput {
    pub mode: PublishModeName,
    pub collection_id: String,
    pub files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_request_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishModeName {
    WriteToDisk,
    PullRequest,
}

/// Output for generate-config command
#[derive(Debug, Serialize)]
pub struct GenerateConfigOutput {
    pub files: Vec<String>,
}

/// One row of the lint table
#[derive(Debug, Serialize, Tabled)]
pub struct LintRow {
    #[tabled(rename = "Rule")]
    pub rule: String,
    #[tabled(rename = "Variable")]
    pub variable: String,
    #[tabled(rename = "Message")]
    pub message: String,
}

/// One row of the settings table
#[derive(Debug, Serialize, Tabled)]
pub struct SettingRow {
    #[tabled(rename = "Setting")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

impl SettingRow {
    pub fn new(key: String, value: String, source: ConfigSource) -> Self {
        Self {
            key,
            value,
            source: format!("{:?}", source),
        }
    }
}
