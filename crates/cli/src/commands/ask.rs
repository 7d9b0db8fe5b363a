//! Ask command handler.
//!
//! Answers one question with the selected engine and prints the answer
//! with its source fragments.

use clap::Args;
use normas_core::{config::AppConfig, AppError, AppResult};
use normas_retrieval::{ConversationTurn, PipelineStrategy};
use std::path::{Path, PathBuf};

use super::output::{answer_json, render_answer, FAILURE_MESSAGE};
use crate::engine::build_engine;

/// Answer a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Answer engine (hybrid, hyde, refine, focus, council, unified, routed)
    #[arg(short, long, default_value = "hybrid")]
    pub engine: String,

    /// Source document to search in the focus engine (repeatable)
    #[arg(short, long = "norm")]
    pub norms: Vec<String>,

    /// JSON file with previous conversation turns
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Maximum characters of each source snippet
    #[arg(long, default_value = "200")]
    pub snippet_chars: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let strategy = PipelineStrategy::parse(&self.engine, self.norms.clone())?;
        let history = match &self.history {
            Some(path) => load_history(path)?,
            None => Vec::new(),
        };

        let engine = build_engine(config).await?;

        match engine.answer(&strategy, &self.question, &history).await {
            Ok(answer) if self.json => println!("{}", answer_json(&answer)?),
            Ok(answer) => println!("{}", render_answer(&answer, self.snippet_chars)),
            Err(e) => {
                tracing::error!("Failed to answer with {}: {}", strategy, e);
                println!("{}", FAILURE_MESSAGE);
            }
        }

        Ok(())
    }
}

/// Read a JSON array of `{"role", "content"}` turns.
fn load_history(path: &Path) -> AppResult<Vec<ConversationTurn>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!("Failed to read history file {:?}: {}", path, e))
    })?;
    let turns: Vec<ConversationTurn> = serde_json::from_str(&contents)?;
    tracing::debug!("Loaded {} history turns", turns.len());
    Ok(turns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use normas_retrieval::Role;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_history() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"role": "user", "content": "Fale da circular 3978"}},
               {{"role": "assistant", "content": "Trata de PLD."}}]"#
        )
        .unwrap();

        let turns = load_history(file.path()).unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[1].content, "Trata de PLD.");
    }

    #[test]
    fn test_load_history_rejects_bad_role() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"[{{"role": "system", "content": "x"}}]"#).unwrap();
        assert!(load_history(file.path()).is_err());
    }
}
