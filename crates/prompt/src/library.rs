//! Compiled prompt set used by the retrieval pipeline.

use crate::builder::{check_variables, new_registry};
use crate::defaults::{builtin_prompt, ids, BUILTIN_PROMPT_IDS};
use crate::loader::{list_prompts, load_prompt};
use crate::types::PromptDefinition;
use handlebars::Handlebars;
use normas_core::{AppError, AppResult};
use std::collections::HashMap;
use std::path::Path;

/// Resolved and compiled prompts, keyed by id.
///
/// Built once when the engine is constructed. Rendering never touches the
/// filesystem.
pub struct PromptLibrary {
    registry: Handlebars<'static>,
    definitions: HashMap<String, PromptDefinition>,
}

impl std::fmt::Debug for PromptLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<&String> = self.definitions.keys().collect();
        ids.sort();
        f.debug_struct("PromptLibrary").field("prompts", &ids).finish()
    }
}

impl PromptLibrary {
    /// Library with only the built-in prompts.
    pub fn builtin() -> AppResult<Self> {
        let mut library = Self {
            registry: new_registry(),
            definitions: HashMap::new(),
        };
        for id in BUILTIN_PROMPT_IDS {
            let def = builtin_prompt(id)
                .ok_or_else(|| AppError::Prompt(format!("Missing built-in prompt {}", id)))?;
            library.insert(def)?;
        }
        Ok(library)
    }

    /// Built-in prompts with workspace overrides from `.normas/prompts/` applied.
    pub fn load(workspace_path: &Path) -> AppResult<Self> {
        let mut library = Self::builtin()?;
        for id in list_prompts(workspace_path)? {
            library.insert(load_prompt(workspace_path, &id)?)?;
        }
        Ok(library)
    }

    /// Replace the question-answering template.
    pub fn with_qa_template(mut self, template: Option<&str>) -> AppResult<Self> {
        if let Some(template) = template {
            let mut def = builtin_prompt(ids::QA)
                .ok_or_else(|| AppError::Prompt("Missing built-in prompt rag.qa".to_string()))?;
            def.template = template.to_string();
            self.insert(def)?;
        }
        Ok(self)
    }

    /// Add or replace a prompt, compiling its template.
    pub fn insert(&mut self, definition: PromptDefinition) -> AppResult<()> {
        self.registry
            .register_template_string(&definition.id, &definition.template)
            .map_err(|e| {
                AppError::Prompt(format!(
                    "Failed to register template {}: {}",
                    definition.id, e
                ))
            })?;
        self.definitions.insert(definition.id.clone(), definition);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&PromptDefinition> {
        self.definitions.get(id)
    }

    /// Render a prompt.
    pub fn render(&self, id: &str, variables: &[(&str, &str)]) -> AppResult<String> {
        let definition = self
            .definitions
            .get(id)
            .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", id)))?;

        let variables: HashMap<String, String> = variables
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        check_variables(definition, &variables)?;

        self.registry
            .render(id, &variables)
            .map_err(|e| AppError::Prompt(format!("Failed to render template {}: {}", id, e)))
    }
}
