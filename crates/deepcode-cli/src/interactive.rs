use dialoguer::Input;
use deepcode_core::builder::GcmdKeywordResolver;
use deepcode_core::error::{DeepCodeError, Result};
use deepcode_core::extract::VariableMetadata;

/// Asks on the terminal for each variable lacking a GCMD keyword URL
pub struct PromptGcmdKeyword;

impl GcmdKeywordResolver for PromptGcmdKeyword {
    fn resolve(&self, variable: &VariableMetadata) -> Result<String> {
        let missing = || DeepCodeError::MissingGcmdKeyword {
            variable_id: variable.variable_id.clone(),
        };

        let url: String = Input::new()
            .with_prompt(format!(
                "GCMD keyword URL for variable '{}'",
                variable.variable_id
            ))
            .allow_empty(true)
            .interact_text()
            .map_err(|_| missing())?;

        let url = url.trim();
        if url.is_empty() {
            return Err(missing());
        }
        Ok(url.to_string())
    }
}
