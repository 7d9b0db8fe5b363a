//! Configuration management for Normas.
//!
//! Configuration is layered, later sources winning:
//! - Built-in defaults
//! - Config file (`.normas/config.yaml` or `NORMAS_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! The retrieval pipeline never reads configuration on its own. It receives a
//! fully resolved [`PipelineConfig`] when it is constructed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .normas/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Active generation provider ("ollama", "openai")
    pub provider: String,

    /// Default model identifier
    pub model: String,

    /// API key for the generation provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Generation provider configurations
    pub llm: Option<LlmConfig>,

    /// Re-ranking service settings
    pub rerank: RerankSettings,

    /// Embedding service settings
    pub embedding: EmbeddingSettings,

    /// Ordered fragment corpus (JSON lines). Relative paths resolve against the workspace.
    pub corpus_path: Option<PathBuf>,

    /// Retrieval pipeline settings
    pub pipeline: PipelineConfig,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
        timeout: Option<u64>,
    },
    Ollama {
        endpoint: String,
        model: String,
        timeout: Option<u64>,
    },
}

/// Re-ranking service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RerankSettings {
    /// "cohere" or "none" (keeps retrieval order)
    pub provider: String,
    pub model: String,
    pub api_key_env: String,
    pub endpoint: Option<String>,
    pub timeout: Option<u64>,
}

impl Default for RerankSettings {
    fn default() -> Self {
        Self {
            provider: "none".to_string(),
            model: "rerank-multilingual-v3.0".to_string(),
            api_key_env: "COHERE_API_KEY".to_string(),
            endpoint: None,
            timeout: Some(60),
        }
    }
}

/// Embedding service settings used for query (and missing fragment) embeddings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbeddingSettings {
    /// "ollama" or "mock"
    pub provider: String,
    pub model: String,
    pub dimensions: usize,
    pub endpoint: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
            endpoint: None,
        }
    }
}

/// Retrieval pipeline configuration.
///
/// Every recognised option has a default; a config file only needs to list
/// the values it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    /// Generation model. `None` falls back to the active provider model.
    pub model_name: Option<String>,

    /// Model for the synthesis stage. `None` uses `model_name`.
    pub synthesis_model: Option<String>,

    /// Replacement for the built-in question-answering template.
    pub prompt_template: Option<String>,

    /// Candidates requested from each retriever before fusion.
    pub search_k: usize,

    /// Candidates kept by the re-ranker.
    pub rerank_top_n: usize,

    /// Top re-ranked candidates that get widened.
    pub widen_top_n: usize,

    /// Fusion weight of the keyword retriever.
    pub keyword_weight: f64,

    /// Fusion weight of the vector retriever.
    pub vector_weight: f64,

    /// Rank smoothing constant of the weighted rank fusion.
    pub rrf_c: f64,

    /// Candidates for the plain vector search of factual questions.
    pub factual_k: usize,

    /// Upper bound for a single fan-out branch.
    pub branch_timeout_secs: u64,

    /// Sampling temperature for every generation call.
    pub temperature: f32,

    pub refine: RefineConfig,
    pub focus: FocusConfig,
    pub unified: UnifiedConfig,
    pub hyde: HydeConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_name: None,
            synthesis_model: None,
            prompt_template: None,
            search_k: 30,
            rerank_top_n: 10,
            widen_top_n: 7,
            keyword_weight: 0.5,
            vector_weight: 0.5,
            rrf_c: 60.0,
            factual_k: 6,
            branch_timeout_secs: 180,
            temperature: 0.0,
            refine: RefineConfig::default(),
            focus: FocusConfig::default(),
            unified: UnifiedConfig::default(),
            hyde: HydeConfig::default(),
        }
    }
}

/// Rewrite-and-refine strategy limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RefineConfig {
    pub search_k: usize,
    pub rerank_top_n: usize,
    /// Distinct source documents that get a scoped second search.
    pub max_documents: usize,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            search_k: 25,
            rerank_top_n: 18,
            max_documents: 3,
        }
    }
}

/// Focus (selected documents) strategy limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FocusConfig {
    pub search_k: usize,
    pub widen_top_n: usize,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            search_k: 20,
            widen_top_n: 5,
        }
    }
}

/// Unified strategy limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UnifiedConfig {
    pub search_k: usize,
    pub rerank_top_n: usize,
}

impl Default for UnifiedConfig {
    fn default() -> Self {
        Self {
            search_k: 70,
            rerank_top_n: 9,
        }
    }
}

/// Hypothetical-document strategy limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HydeConfig {
    pub widen_top_n: usize,
}

impl Default for HydeConfig {
    fn default() -> Self {
        Self { widen_top_n: 10 }
    }
}

impl PipelineConfig {
    /// Check value ranges.
    pub fn validate(&self) -> AppResult<()> {
        let limits = [
            ("searchK", self.search_k),
            ("rerankTopN", self.rerank_top_n),
            ("refine.searchK", self.refine.search_k),
            ("refine.rerankTopN", self.refine.rerank_top_n),
            ("focus.searchK", self.focus.search_k),
            ("unified.searchK", self.unified.search_k),
            ("unified.rerankTopN", self.unified.rerank_top_n),
            ("factualK", self.factual_k),
        ];
        for (name, value) in limits {
            if value == 0 {
                return Err(AppError::Config(format!(
                    "pipeline.{} must be greater than zero",
                    name
                )));
            }
        }

        if self.keyword_weight < 0.0 || self.vector_weight < 0.0 {
            return Err(AppError::Config(
                "pipeline fusion weights must not be negative".to_string(),
            ));
        }
        if self.keyword_weight + self.vector_weight == 0.0 {
            return Err(AppError::Config(
                "at least one pipeline fusion weight must be positive".to_string(),
            ));
        }
        if self.rrf_c <= 0.0 {
            return Err(AppError::Config(
                "pipeline.rrfC must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    rerank: Option<RerankSettings>,
    embedding: Option<EmbeddingSettings>,
    corpus: Option<CorpusConfig>,
    pipeline: Option<PipelineConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CorpusConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(),
            model: "llama3.2".to_string(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
            rerank: RerankSettings::default(),
            embedding: EmbeddingSettings::default(),
            corpus_path: None,
            pipeline: PipelineConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, the config file and defaults.
    ///
    /// Environment variables:
    /// - `NORMAS_WORKSPACE`: Override workspace path
    /// - `NORMAS_CONFIG`: Path to config file
    /// - `NORMAS_PROVIDER`: Generation provider
    /// - `NORMAS_MODEL`: Model identifier
    /// - `NORMAS_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("NORMAS_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("NORMAS_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.workspace.join(".normas/config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("NORMAS_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("NORMAS_MODEL") {
            config.model = model;
        }

        config.api_key = std::env::var("NORMAS_API_KEY").ok();
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    pub fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(ws) = config_file.workspace {
            if let Some(path) = ws.path {
                result.workspace = PathBuf::from(path);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = match provider_config {
                    ProviderConfig::OpenAI { model, .. } => model.clone(),
                    ProviderConfig::Ollama { model, .. } => model.clone(),
                };
            }

            result.llm = Some(llm);
        }

        if let Some(rerank) = config_file.rerank {
            result.rerank = rerank;
        }

        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }

        if let Some(corpus) = config_file.corpus {
            if let Some(path) = corpus.path {
                result.corpus_path = Some(PathBuf::from(path));
            }
        }

        if let Some(pipeline) = config_file.pipeline {
            result.pipeline = pipeline;
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .normas directory.
    pub fn normas_dir(&self) -> PathBuf {
        self.workspace.join(".normas")
    }

    /// Resolve the ordered fragment corpus path.
    pub fn corpus_file(&self) -> PathBuf {
        match self.corpus_path {
            Some(ref path) if path.is_absolute() => path.clone(),
            Some(ref path) => self.workspace.join(path),
            None => self.normas_dir().join("corpus").join("fragments.jsonl"),
        }
    }

    /// Model used for generation once pipeline overrides are applied.
    pub fn generation_model(&self) -> String {
        self.pipeline
            .model_name
            .clone()
            .unwrap_or_else(|| self.model.clone())
    }

    /// Get the configuration of a generation provider.
    pub fn get_provider_config(&self, provider: &str) -> Option<ProviderConfig> {
        self.llm
            .as_ref()
            .and_then(|llm| llm.providers.get(provider).cloned())
    }

    /// Resolve the endpoint of a generation provider, if configured.
    pub fn provider_endpoint(&self, provider: &str) -> Option<String> {
        match self.get_provider_config(provider)? {
            ProviderConfig::Ollama { endpoint, .. } => Some(endpoint),
            ProviderConfig::OpenAI { endpoint, .. } => endpoint,
        }
    }

    /// Resolve the API key of a generation provider.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        match self.get_provider_config(provider)? {
            ProviderConfig::OpenAI { api_key_env, .. } => std::env::var(api_key_env).ok(),
            ProviderConfig::Ollama { .. } => None,
        }
    }

    /// Resolve the API key of the re-ranking service.
    pub fn resolve_rerank_api_key(&self) -> Option<String> {
        std::env::var(&self.rerank.api_key_env).ok()
    }

    /// Validate configuration for the active providers.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["openai", "ollama"];
        if !known_providers.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }

        if let Some(ProviderConfig::OpenAI { api_key_env, .. }) =
            self.get_provider_config(&self.provider)
        {
            if self.api_key.is_none() && std::env::var(&api_key_env).is_err() {
                return Err(AppError::Config(format!(
                    "API key not found in environment variable: {}",
                    api_key_env
                )));
            }
        }

        let known_rerankers = ["cohere", "none"];
        if !known_rerankers.contains(&self.rerank.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown rerank provider: {}. Supported: {}",
                self.rerank.provider,
                known_rerankers.join(", ")
            )));
        }

        let known_embedders = ["ollama", "mock"];
        if !known_embedders.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                known_embedders.join(", ")
            )));
        }

        self.pipeline.validate()
    }
}
