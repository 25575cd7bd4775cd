//! Publication-readiness checks on an opened dataset

use serde::Serialize;

use crate::models::Dataset;

pub const RULE_DATASET_DESCRIPTION: &str = "deepcode/dataset-description";
pub const RULE_VARIABLE_GCMD_KEYWORD_URL: &str = "deepcode/variable-gcmd-keyword-url";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintIssue {
    pub rule: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LintReport {
    pub issues: Vec<LintIssue>,
}

impl LintReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Every rule reports at error severity
    pub fn error_count(&self) -> usize {
        self.issues.len()
    }
}

/// Check the attributes catalog generation relies on
pub fn lint_dataset(dataset: &Dataset) -> LintReport {
    let mut issues = Vec::new();

    if !dataset.attrs.contains_key("description") {
        issues.push(LintIssue {
            rule: RULE_DATASET_DESCRIPTION,
            message: "Dataset missing required 'description' attribute.".to_string(),
            variable: None,
            suggestion: Some("Add a 'description' attribute to dataset.attrs.".to_string()),
        });
    }

    for variable in &dataset.data_vars {
        if !variable.attrs.contains_key("gcmd_keyword_url") {
            issues.push(LintIssue {
                rule: RULE_VARIABLE_GCMD_KEYWORD_URL,
                message: format!("Variable '{}' missing 'gcmd_keyword_url' attribute.", variable.name),
                variable: Some(variable.name.clone()),
                suggestion: None,
            });
        }
    }

    LintReport { issues }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, DataVariable};

    #[test]
    fn test_clean_dataset() {
        let dataset = Dataset::new()
            .with_attr("description", "cube")
            .with_data_var(DataVariable::new("ndvi").with_attr("gcmd_keyword_url", "https://x"));

        let report = lint_dataset(&dataset);
        assert!(report.is_clean());
        assert_eq!(report.error_count(), 0);
    }

    #[test]
    fn test_reports_each_rule() {
        let dataset = Dataset::new()
            .with_coord("lon", Coordinate::numeric(vec![0.0]))
            .with_data_var(DataVariable::new("ndvi"))
            .with_data_var(DataVariable::new("lst").with_attr("gcmd_keyword_url", "https://x"));

        let report = lint_dataset(&dataset);

        assert_eq!(report.error_count(), 2);
        assert_eq!(report.issues[0].rule, RULE_DATASET_DESCRIPTION);
        assert_eq!(report.issues[1].rule, RULE_VARIABLE_GCMD_KEYWORD_URL);
        assert_eq!(report.issues[1].variable.as_deref(), Some("ndvi"));
    }
}
