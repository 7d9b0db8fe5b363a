//! Chat command handler.
//!
//! Reads questions from stdin and keeps the conversation in memory so
//! follow-up questions are condensed against what was already said.

use clap::Args;
use normas_core::{config::AppConfig, AppResult};
use normas_retrieval::{ConversationTurn, PipelineStrategy};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::output::{render_answer, FAILURE_MESSAGE};
use crate::engine::build_engine;

const EXIT_COMMANDS: &[&str] = &["sair", "exit", "quit"];
const CLEAR_COMMAND: &str = "/limpar";

/// Interactive conversation with history
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Answer engine (hybrid, hyde, refine, focus, council, unified, routed)
    #[arg(short, long, default_value = "hybrid")]
    pub engine: String,

    /// Source document to search in the focus engine (repeatable)
    #[arg(short, long = "norm")]
    pub norms: Vec<String>,

    /// Maximum characters of each source snippet
    #[arg(long, default_value = "200")]
    pub snippet_chars: usize,
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let strategy = PipelineStrategy::parse(&self.engine, self.norms.clone())?;
        let engine = build_engine(config).await?;
        let mut history: Vec<ConversationTurn> = Vec::new();

        println!(
            "Converse sobre as normas ({}). Digite '{}' para encerrar ou '{}' para limpar o histórico.",
            strategy, EXIT_COMMANDS[0], CLEAR_COMMAND
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush().ok();

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let question = line.trim();
            if question.is_empty() {
                continue;
            }
            if is_exit(question) {
                break;
            }
            if question == CLEAR_COMMAND {
                history.clear();
                println!("Histórico limpo.");
                continue;
            }

            match engine.answer(&strategy, question, &history).await {
                Ok(answer) => {
                    println!("{}\n", render_answer(&answer, self.snippet_chars));
                    history.push(ConversationTurn::user(question));
                    history.push(ConversationTurn::assistant(answer.answer));
                }
                Err(e) => {
                    tracing::error!("Failed to answer with {}: {}", strategy, e);
                    println!("{}\n", FAILURE_MESSAGE);
                }
            }
        }

        tracing::debug!("Chat ended after {} turns", history.len() / 2);
        Ok(())
    }
}

fn is_exit(input: &str) -> bool {
    EXIT_COMMANDS.iter().any(|c| input.eq_ignore_ascii_case(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_exit() {
        assert!(is_exit("sair"));
        assert!(is_exit("EXIT"));
        assert!(!is_exit("sair da norma"));
    }
}
