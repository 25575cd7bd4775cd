//! Open Science Catalog extension fields and naming helpers

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::constants::{CF_SCHEMA_URI, OSC_SCHEMA_URI, OSC_THEME_SCHEME, THEMES_SCHEMA_URI};
use crate::error::{DeepCodeError, Result};
use crate::models::{Theme, ThemeConcept};

/// Fields an OSC product collection carries under the `osc:` and `cf:` namespaces
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OscProductFields {
    #[serde(rename = "osc:type")]
    pub osc_type: Option<String>,
    #[serde(rename = "osc:project")]
    pub osc_project: Option<String>,
    #[serde(rename = "osc:status")]
    pub osc_status: Option<String>,
    #[serde(rename = "osc:name", skip_serializing_if = "Option::is_none")]
    pub osc_name: Option<String>,
    #[serde(rename = "osc:region")]
    pub osc_region: Option<String>,
    #[serde(rename = "osc:variables")]
    pub osc_variables: Vec<String>,
    #[serde(rename = "osc:missions")]
    pub osc_missions: Vec<String>,
    #[serde(rename = "cf:parameter")]
    pub cf_parameter: Vec<Value>,
}

impl OscProductFields {
    /// Every required field must be present and non-empty
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("osc:type", &self.osc_type),
            ("osc:project", &self.osc_project),
            ("osc:status", &self.osc_status),
        ];

        let missing: Vec<String> = required
            .iter()
            .filter(|(_, value)| value.as_deref().map_or(true, str::is_empty))
            .map(|(name, _)| name.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DeepCodeError::Validation { missing })
        }
    }
}

/// Add the OSC, CF and themes schema URIs, each once
pub fn ensure_extensions(extensions: &mut Vec<String>) {
    for uri in [OSC_SCHEMA_URI, CF_SCHEMA_URI, THEMES_SCHEMA_URI] {
        if !extensions.iter().any(|existing| existing == uri) {
            extensions.push(uri.to_string());
        }
    }
}

/// Human-readable title from an identifier: `"sea_surface-temp"` becomes `"Sea Surface Temp"`
pub fn format_string(s: &str) -> String {
    s.trim_matches(|c| c == ' ' || c == '_')
        .replace(['_', '-'], " ")
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First character uppercased, the rest lowercased
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// ISO-8601 timestamp written to `created`/`updated` fields
pub fn iso_timestamp(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339()
}

/// Wrap theme ids into a single OSC theme block
pub fn build_theme(themes: &[String]) -> Theme {
    Theme {
        concepts: themes
            .iter()
            .map(|id| ThemeConcept { id: id.clone() })
            .collect(),
        scheme: OSC_THEME_SCHEME.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_string() {
        assert_eq!(format_string(""), "");
        assert_eq!(format_string("too___many___underscores"), "Too Many Underscores");
        assert_eq!(format_string("  _land-surface_ "), "Land Surface");
        assert_eq!(format_string("NDVI"), "Ndvi");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("cLIMATE"), "Climate");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_validate_lists_missing_fields() {
        let fields = OscProductFields {
            osc_type: Some("product".to_string()),
            osc_status: Some(String::new()),
            ..Default::default()
        };

        match fields.validate() {
            Err(DeepCodeError::Validation { missing }) => {
                assert_eq!(missing, vec!["osc:project", "osc:status"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_ensure_extensions_is_idempotent() {
        let mut extensions = vec![OSC_SCHEMA_URI.to_string()];
        ensure_extensions(&mut extensions);
        ensure_extensions(&mut extensions);
        assert_eq!(extensions, vec![OSC_SCHEMA_URI, CF_SCHEMA_URI, THEMES_SCHEMA_URI]);
    }

    #[test]
    fn test_build_theme() {
        let theme = build_theme(&["land".to_string(), "climate".to_string()]);
        assert_eq!(theme.scheme, OSC_THEME_SCHEME);
        assert_eq!(theme.concepts[1].id, "climate");
    }
}
