//! Wiring of the answer engine from configuration.

use normas_core::config::{AppConfig, ProviderConfig};
use normas_core::AppResult;
use normas_llm::{create_client, create_reranker};
use normas_prompt::PromptLibrary;
use normas_retrieval::{
    create_provider, load_corpus, AnswerEngine, Bm25Index, EmbeddingIndex, Generator, Reranker,
};
use std::sync::Arc;

/// Load the corpus, build both indexes and connect the services.
pub async fn build_engine(config: &AppConfig) -> AppResult<AnswerEngine> {
    config.validate()?;

    let corpus_path = config.corpus_file();
    tracing::info!("Loading corpus from {}", corpus_path.display());
    let corpus = load_corpus(&corpus_path)?;
    tracing::info!(
        "Loaded {} fragments ({} without embeddings)",
        corpus.store.len(),
        corpus.missing_embeddings()
    );

    let store = Arc::new(corpus.store);
    let keyword = Arc::new(Bm25Index::build(store.fragments()));

    let embedder = create_provider(&config.embedding)?;
    let vector = Arc::new(EmbeddingIndex::build(&store, corpus.embeddings, embedder).await?);

    let endpoint = config.provider_endpoint(&config.provider);
    let api_key = config.resolve_api_key(&config.provider);
    let client = create_client(
        &config.provider,
        endpoint.as_deref(),
        api_key.as_deref(),
        provider_timeout(config),
    )?;

    let rerank_key = config.resolve_rerank_api_key();
    let rerank_client = create_reranker(
        &config.rerank.provider,
        Some(config.rerank.model.as_str()).filter(|m| !m.is_empty()),
        config.rerank.endpoint.as_deref(),
        rerank_key.as_deref(),
        config.rerank.timeout,
    )?;

    let prompts = PromptLibrary::load(&config.workspace)?
        .with_qa_template(config.pipeline.prompt_template.as_deref())?;

    let generator = Generator::new(
        client,
        config.generation_model(),
        config.pipeline.temperature,
    );
    tracing::debug!(
        "Generation via {} ({}), re-ranking via {}",
        config.provider,
        generator.model(),
        config.rerank.provider
    );

    Ok(AnswerEngine::new(
        store,
        keyword,
        vector,
        Reranker::new(rerank_client),
        generator,
        Arc::new(prompts),
        config.pipeline.clone(),
    ))
}

fn provider_timeout(config: &AppConfig) -> Option<u64> {
    match config.get_provider_config(&config.provider)? {
        ProviderConfig::OpenAI { timeout, .. } => timeout,
        ProviderConfig::Ollama { timeout, .. } => timeout,
    }
}
