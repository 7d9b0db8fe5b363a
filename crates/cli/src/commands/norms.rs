//! Norms command handler.
//!
//! Lists the source documents of the corpus, in corpus order.

use clap::Args;
use normas_core::{config::AppConfig, AppError, AppResult};
use normas_retrieval::{load_corpus, DocumentSummary};

/// List the norms available in the corpus
#[derive(Args, Debug)]
pub struct NormsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl NormsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing norms command");

        let corpus = load_corpus(&config.corpus_file())?;
        let documents = corpus.store.documents();
        tracing::debug!("Corpus has {} documents", documents.len());

        if self.json {
            let json = serde_json::to_string_pretty(&documents)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else if documents.is_empty() {
            println!("Nenhuma norma carregada.");
        } else {
            print!("{}", render_table(&documents));
        }

        Ok(())
    }
}

fn render_table(documents: &[DocumentSummary]) -> String {
    let width = documents
        .iter()
        .map(|d| d.source_document.chars().count())
        .max()
        .unwrap_or(0)
        .max("Documento".len());

    let mut out = format!("{:<width$}  {:<24}  {:>9}\n", "Documento", "Norma", "Trechos");
    for doc in documents {
        let norm = match (doc.norm_type, doc.norm_number.as_deref()) {
            (Some(norm_type), Some(number)) => format!("{} {}", norm_type.label(), number),
            (Some(norm_type), None) => norm_type.label().to_string(),
            _ => "-".to_string(),
        };
        out.push_str(&format!(
            "{:<width$}  {:<24}  {:>9}\n",
            doc.source_document, norm, doc.fragment_count
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use normas_retrieval::NormType;

    #[test]
    fn test_render_table() {
        let documents = vec![
            DocumentSummary {
                source_document: "Res_4958.pdf".to_string(),
                norm_type: Some(NormType::Resolucao),
                norm_number: Some("4958".to_string()),
                fragment_count: 12,
            },
            DocumentSummary {
                source_document: "anexo.pdf".to_string(),
                norm_type: None,
                norm_number: None,
                fragment_count: 1,
            },
        ];

        let table = render_table(&documents);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Documento"));
        assert!(lines[1].contains(NormType::Resolucao.label()));
        assert!(lines[1].ends_with("12"));
        assert!(lines[2].contains(" - "));
    }
}
