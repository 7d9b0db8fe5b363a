//! Template rendering.

use crate::types::PromptDefinition;
use handlebars::Handlebars;
use normas_core::{AppError, AppResult};
use std::collections::HashMap;

/// Create a registry configured for plain-text prompts.
///
/// Escaping is disabled and strict mode turns a missing variable into a
/// render error instead of an empty string.
pub(crate) fn new_registry() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);
    handlebars
}

/// Fail when a declared variable was not supplied.
pub(crate) fn check_variables(
    definition: &PromptDefinition,
    variables: &HashMap<String, String>,
) -> AppResult<()> {
    if let Some(missing) = definition
        .variables
        .iter()
        .find(|name| !variables.contains_key(name.as_str()))
    {
        return Err(AppError::Prompt(format!(
            "Prompt {} requires variable '{}'",
            definition.id, missing
        )));
    }
    Ok(())
}
