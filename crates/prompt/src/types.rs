//! Prompt definitions.

use serde::{Deserialize, Serialize};

/// A prompt definition, either built in or loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier (e.g., "rag.qa")
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Variables the template expects. Rendering fails if one is missing.
    #[serde(default)]
    pub variables: Vec<String>,

    /// Template string with Handlebars syntax
    pub template: String,

    /// Output specification
    #[serde(default)]
    pub output: PromptOutputSpec,
}

/// Output specification for the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptOutputSpec {
    /// "text", "markdown" or "json"
    pub format: String,
}

impl Default for PromptOutputSpec {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_definition_deserialization() {
        let yaml = r#"
id: rag.qa
title: Resposta direta
apiVersion: "1.0"
variables: [context, question]
template: "{{context}} / {{question}}"
output:
  format: markdown
"#;

        let def: PromptDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.id, "rag.qa");
        assert_eq!(def.variables, vec!["context", "question"]);
        assert_eq!(def.output.format, "markdown");
    }

    #[test]
    fn test_output_defaults_to_text() {
        let yaml = "id: x\ntitle: X\napiVersion: \"1.0\"\ntemplate: \"{{question}}\"\n";
        let def: PromptDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.output.format, "text");
        assert!(def.variables.is_empty());
    }
}
