//! Loader for workspace prompt overrides.
//!
//! Overrides live in `.normas/prompts/<id>.yml` and replace the built-in
//! prompt with the same id.

use crate::types::PromptDefinition;
use normas_core::{AppError, AppResult};
use std::path::Path;

fn prompts_dir(workspace_path: &Path) -> std::path::PathBuf {
    workspace_path.join(".normas/prompts")
}

/// Load a prompt definition by id from the workspace.
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompts_dir(workspace_path).join(format!("{}.yml", prompt_id));

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    if !prompt_file.exists() {
        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?}",
            prompt_file
        )));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition, prompt_id)?;

    tracing::info!("Loaded prompt override: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// List the ids of all prompt overrides in the workspace, sorted.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<String>> {
    let dir = prompts_dir(workspace_path);

    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut prompt_ids = Vec::new();

    for entry in walkdir::WalkDir::new(&dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                prompt_ids.push(stem.to_string());
            }
        }
    }

    prompt_ids.sort();
    Ok(prompt_ids)
}

fn validate_prompt(def: &PromptDefinition, expected_id: &str) -> AppResult<()> {
    if def.id != expected_id {
        return Err(AppError::Prompt(format!(
            "Prompt file {}.yml declares id '{}'",
            expected_id, def.id
        )));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_prompt(dir: &Path, file_id: &str, contents: &str) {
        let prompts = dir.join(".normas/prompts");
        fs::create_dir_all(&prompts).unwrap();
        fs::write(prompts.join(format!("{}.yml", file_id)), contents).unwrap();
    }

    fn valid_yaml(id: &str) -> String {
        format!(
            "id: {}\ntitle: \"Teste\"\napiVersion: \"1.0\"\nvariables: [question]\ntemplate: \"P: {{{{question}}}}\"\n",
            id
        )
    }

    #[test]
    fn test_load_valid_prompt() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "rag.hyde", &valid_yaml("rag.hyde"));

        let prompt = load_prompt(temp_dir.path(), "rag.hyde").unwrap();
        assert_eq!(prompt.id, "rag.hyde");
        assert_eq!(prompt.template, "P: {{question}}");
    }

    #[test]
    fn test_load_nonexistent_prompt() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_prompt(temp_dir.path(), "rag.qa").is_err());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "rag.qa", "invalid: yaml: content:");
        assert!(load_prompt(temp_dir.path(), "rag.qa").is_err());
    }

    #[test]
    fn test_id_must_match_file_name() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "rag.qa", &valid_yaml("rag.route"));
        assert!(load_prompt(temp_dir.path(), "rag.qa").is_err());
    }

    #[test]
    fn test_list_prompts() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "rag.route", &valid_yaml("rag.route"));
        write_prompt(temp_dir.path(), "rag.hyde", &valid_yaml("rag.hyde"));

        let prompts = list_prompts(temp_dir.path()).unwrap();
        assert_eq!(prompts, vec!["rag.hyde", "rag.route"]);
    }
}
