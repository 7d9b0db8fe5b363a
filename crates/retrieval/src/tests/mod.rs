//! Cross-module tests and the fakes they share.


use async_trait::async_trait;
use normas_core::{AppError, AppResult, PipelineConfig};
use normas_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage, RerankClient, RerankHit, RerankRequest};
use normas_prompt::PromptLibrary;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::embeddings::providers::MockProvider;
use crate::filter::FragmentFilter;
use crate::keyword::Bm25Index;
use crate::pipeline::AnswerEngine;
use crate::rerank::Reranker;
use crate::store::FragmentStore;
use crate::synthesis::Generator;
use crate::types::{Fragment, FragmentMetadata, NormType};
use crate::vector::{EmbeddingIndex, VectorRetriever};

pub(crate) const CONDENSE_MARKER: &str = "Pergunta Autônoma:";
pub(crate) const HYDE_MARKER: &str = "Resposta Fictícia:";
pub(crate) const REWRITE_MARKER: &str = "Pergunta Otimizada para Busca:";
pub(crate) const EXTRACT_MARKER: &str = "APENAS O JSON";
pub(crate) const ROUTE_MARKER: &str = "Categoria:";
pub(crate) const SYNTHESIS_MARKER: &str = "Sua Análise Final:";
pub(crate) const FORMAT_MARKER: &str = "Sua Resposta Final:";

pub(crate) const QA_REPLY: &str = "RESPOSTA";
pub(crate) const SYNTHESIS_REPLY: &str = "ANÁLISE";
pub(crate) const FORMAT_REPLY: &str = "RESPOSTA FORMATADA";

/// Generation fake that answers by recognising which prompt it received.
#[derive(Debug)]
pub(crate) struct FakeLlm {
    prompts: Mutex<Vec<String>>,
    models: Mutex<Vec<String>>,
    condensed: Mutex<String>,
    hypothetical: Mutex<String>,
    rewritten: Mutex<String>,
    extraction: Mutex<String>,
    route: Mutex<String>,
    fail_on: Mutex<Option<String>>,
    delay_on: Mutex<Option<(String, Duration)>>,
    fail_all: bool,
}

impl FakeLlm {
    fn build(fail_all: bool) -> Arc<Self> {
        Arc::new(Self {
            prompts: Mutex::new(Vec::new()),
            models: Mutex::new(Vec::new()),
            condensed: Mutex::new("Pergunta reformulada".to_string()),
            hypothetical: Mutex::new(
                "As instituições devem implementar procedimentos de prevenção à lavagem de dinheiro."
                    .to_string(),
            ),
            rewritten: Mutex::new("procedimentos de prevenção à lavagem de dinheiro".to_string()),
            extraction: Mutex::new("{}".to_string()),
            route: Mutex::new("Consulta Normativa".to_string()),
            fail_on: Mutex::new(None),
            delay_on: Mutex::new(None),
            fail_all,
        })
    }

    pub(crate) fn new() -> Arc<Self> {
        Self::build(false)
    }

    pub(crate) fn failing() -> Arc<Self> {
        Self::build(true)
    }

    pub(crate) fn with_condensed(self: Arc<Self>, text: &str) -> Arc<Self> {
        *self.condensed.lock().unwrap() = text.to_string();
        self
    }

    pub(crate) fn with_hypothetical(self: Arc<Self>, text: &str) -> Arc<Self> {
        *self.hypothetical.lock().unwrap() = text.to_string();
        self
    }

    pub(crate) fn with_rewritten(self: Arc<Self>, text: &str) -> Arc<Self> {
        *self.rewritten.lock().unwrap() = text.to_string();
        self
    }

    pub(crate) fn with_extraction(self: Arc<Self>, raw: &str) -> Arc<Self> {
        *self.extraction.lock().unwrap() = raw.to_string();
        self
    }

    pub(crate) fn with_route(self: Arc<Self>, label: &str) -> Arc<Self> {
        *self.route.lock().unwrap() = label.to_string();
        self
    }

    /// Fail every prompt containing `marker`.
    pub(crate) fn failing_on(self: Arc<Self>, marker: &str) -> Arc<Self> {
        *self.fail_on.lock().unwrap() = Some(marker.to_string());
        self
    }

    /// Sleep before answering prompts containing `marker`.
    pub(crate) fn delayed_on(self: Arc<Self>, marker: &str, delay: Duration) -> Arc<Self> {
        *self.delay_on.lock().unwrap() = Some((marker.to_string(), delay));
        self
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub(crate) fn models(&self) -> Vec<String> {
        self.models.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub(crate) fn prompts_with(&self, marker: &str) -> Vec<String> {
        self.prompts()
            .into_iter()
            .filter(|p| p.contains(marker))
            .collect()
    }

    fn reply(&self, prompt: &str) -> String {
        if prompt.contains(CONDENSE_MARKER) {
            self.condensed.lock().unwrap().clone()
        } else if prompt.contains(HYDE_MARKER) {
            self.hypothetical.lock().unwrap().clone()
        } else if prompt.contains(REWRITE_MARKER) {
            self.rewritten.lock().unwrap().clone()
        } else if prompt.contains(EXTRACT_MARKER) {
            self.extraction.lock().unwrap().clone()
        } else if prompt.contains(ROUTE_MARKER) {
            self.route.lock().unwrap().clone()
        } else if prompt.contains(SYNTHESIS_MARKER) {
            SYNTHESIS_REPLY.to_string()
        } else if prompt.contains(FORMAT_MARKER) {
            FORMAT_REPLY.to_string()
        } else {
            QA_REPLY.to_string()
        }
    }
}

#[async_trait]
impl LlmClient for FakeLlm {
    fn provider_name(&self) -> &str {
        "fake"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        self.models.lock().unwrap().push(request.model.clone());

        let delay = self
            .delay_on
            .lock()
            .unwrap()
            .as_ref()
            .filter(|(marker, _)| request.prompt.contains(marker.as_str()))
            .map(|(_, delay)| *delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let should_fail = self.fail_all
            || self
                .fail_on
                .lock()
                .unwrap()
                .as_deref()
                .is_some_and(|marker| request.prompt.contains(marker));
        if should_fail {
            return Err(AppError::Llm("service unavailable".to_string()));
        }

        Ok(LlmResponse {
            content: self.reply(&request.prompt),
            model: request.model.clone(),
            usage: LlmUsage::new(10, 5),
        })
    }
}

/// Re-ranker returning a fixed list of indices, or the submitted order
/// when no script is given.
#[derive(Debug, Default)]
pub(crate) struct ScriptedReranker {
    script: Option<Vec<usize>>,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl ScriptedReranker {
    pub(crate) fn new(script: Vec<usize>) -> Self {
        Self {
            script: Some(script),
            ..Default::default()
        }
    }

    pub(crate) fn passthrough() -> Self {
        Self::default()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl RerankClient for ScriptedReranker {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn rerank(&self, request: &RerankRequest) -> AppResult<Vec<RerankHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(request.query.clone());

        let indices: Vec<usize> = match &self.script {
            Some(script) => script.clone(),
            None => (0..request.documents.len().min(request.top_n)).collect(),
        };
        Ok(indices
            .into_iter()
            .map(|index| RerankHit {
                index,
                relevance_score: 1.0,
            })
            .collect())
    }
}

#[derive(Debug, Default)]
pub(crate) struct FailingReranker;

#[async_trait]
impl RerankClient for FailingReranker {
    fn provider_name(&self) -> &str {
        "failing"
    }

    async fn rerank(&self, _request: &RerankRequest) -> AppResult<Vec<RerankHit>> {
        Err(AppError::Rerank("timeout".to_string()))
    }
}

/// One recorded vector search call.
#[derive(Debug, Clone)]
pub(crate) struct VectorCall {
    pub query: String,
    pub k: usize,
    pub filter: Option<FragmentFilter>,
}

/// Vector retriever that records its calls and delegates to a mock index.
pub(crate) struct RecordingVector {
    inner: EmbeddingIndex,
    calls: Mutex<Vec<VectorCall>>,
}

impl RecordingVector {
    pub(crate) fn calls(&self) -> Vec<VectorCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorRetriever for RecordingVector {
    async fn search(
        &self,
        query: &str,
        k: usize,
        filter: Option<&FragmentFilter>,
    ) -> AppResult<Vec<Arc<Fragment>>> {
        self.calls.lock().unwrap().push(VectorCall {
            query: query.to_string(),
            k,
            filter: filter.cloned(),
        });
        self.inner.search(query, k, filter).await
    }
}

pub(crate) fn fragment(
    doc: &str,
    norm_type: NormType,
    number: &str,
    article: Option<&str>,
    text: &str,
) -> Fragment {
    let mut metadata = FragmentMetadata::new(doc).with_norm(norm_type, number);
    metadata.structural_article = article.map(str::to_string);
    Fragment::new(text, metadata)
}

/// Small interleaved corpus: three documents, circular 3978 has four
/// fragments, all under Art. 12.
pub(crate) fn sample_fragments() -> Vec<Fragment> {
    use NormType::*;
    vec![
        fragment("Res_4958.pdf", Resolucao, "4958", Some("Art. 1º"),
            "Art. 1º Esta Resolução dispõe sobre o Patrimônio de Referência (PR) das instituições financeiras."),
        fragment("Circ_3978.pdf", Circular, "3978", Some("Art. 12"),
            "Art. 12. As instituições devem implementar procedimentos de prevenção à lavagem de dinheiro."),
        fragment("Res_4958.pdf", Resolucao, "4958", Some("Art. 2º"),
            "Art. 2º O Patrimônio de Referência é composto pelo Capital Principal e pelo Capital Complementar."),
        fragment("Circ_3978.pdf", Circular, "3978", Some("Art. 12"),
            "§ 1º Os procedimentos de lavagem de dinheiro devem ser revisados anualmente."),
        fragment("Circ_3978.pdf", Circular, "3978", Some("Art. 12"),
            "§ 2º A avaliação interna de risco considera clientes, produtos e canais."),
        fragment("CCirc_4001.pdf", CartaCircular, "4001", Some("Art. 1º"),
            "Art. 1º Divulga a relação de operações de câmbio consideradas suspeitas de lavagem de dinheiro."),
        fragment("Circ_3978.pdf", Circular, "3978", Some("Art. 12"),
            "§ 3º O diretor responsável deve aprovar a política de prevenção."),
        fragment("Res_4958.pdf", Resolucao, "4958", Some("Art. 2º"),
            "Parágrafo único. O Capital Principal inclui ações e reservas de lucros."),
    ]
}

/// A fully wired engine over fakes.
pub(crate) struct TestRig {
    pub engine: AnswerEngine,
    pub llm: Arc<FakeLlm>,
    pub vector: Arc<RecordingVector>,
}

pub(crate) async fn rig(
    fragments: Vec<Fragment>,
    llm: Arc<FakeLlm>,
    reranker: Arc<dyn RerankClient>,
    config: PipelineConfig,
) -> TestRig {
    let store = Arc::new(FragmentStore::from_fragments(fragments).unwrap());
    let keyword = Arc::new(Bm25Index::build(store.fragments()));
    let index = EmbeddingIndex::build(&store, vec![None; store.len()], Arc::new(MockProvider::new(256)))
        .await
        .unwrap();
    let vector = Arc::new(RecordingVector {
        inner: index,
        calls: Mutex::new(Vec::new()),
    });
    let generator = Generator::new(llm.clone(), "fake-model", 0.0);
    let prompts = Arc::new(PromptLibrary::builtin().unwrap());

    let engine = AnswerEngine::new(
        store,
        keyword,
        vector.clone(),
        Reranker::new(reranker),
        generator,
        prompts,
        config,
    );

    TestRig {
        engine,
        llm,
        vector,
    }
}

/// Engine over the sample corpus with an order-preserving re-ranker.
pub(crate) async fn sample_rig(llm: Arc<FakeLlm>) -> TestRig {
    rig(
        sample_fragments(),
        llm,
        Arc::new(ScriptedReranker::passthrough()),
        PipelineConfig::default(),
    )
    .await
}

pub(crate) fn sources(answer: &crate::types::RagAnswer) -> Vec<&str> {
    answer
        .source_documents
        .iter()
        .map(|f| f.metadata.source_document.as_str())
        .collect()
}
