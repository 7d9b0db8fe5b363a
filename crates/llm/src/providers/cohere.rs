//! Cohere re-ranking provider (`/v2/rerank`).

use crate::rerank::{RerankClient, RerankHit, RerankRequest};
use normas_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use super::http_client;

pub const DEFAULT_RERANK_MODEL: &str = "rerank-multilingual-v3.0";

#[derive(Debug, Serialize)]
struct CohereRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: &'a [String],
    top_n: usize,
}

#[derive(Debug, Deserialize)]
struct CohereResponse {
    results: Vec<CohereResult>,
}

#[derive(Debug, Deserialize)]
struct CohereResult {
    index: usize,
    relevance_score: f64,
}

pub struct CohereReranker {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl CohereReranker {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_options("https://api.cohere.com", api_key, DEFAULT_RERANK_MODEL, None)
    }

    pub fn with_options(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: Option<u64>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client: http_client(timeout_secs),
        }
    }

    /// Drop hits that point outside the submitted list and cap at `top_n`.
    fn convert_response(response: CohereResponse, submitted: usize, top_n: usize) -> Vec<RerankHit> {
        response
            .results
            .into_iter()
            .filter(|r| r.index < submitted)
            .take(top_n)
            .map(|r| RerankHit {
                index: r.index,
                relevance_score: r.relevance_score,
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl RerankClient for CohereReranker {
    fn provider_name(&self) -> &str {
        "cohere"
    }

    async fn rerank(&self, request: &RerankRequest) -> AppResult<Vec<RerankHit>> {
        if request.documents.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(
            documents = request.documents.len(),
            top_n = request.top_n,
            model = %self.model,
            "Sending rerank request to Cohere"
        );

        let body = CohereRequest {
            model: &self.model,
            query: &request.query,
            documents: &request.documents,
            top_n: request.top_n.min(request.documents.len()),
        };

        let url = format!("{}/v2/rerank", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Rerank(format!("Failed to send request to Cohere: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Rerank(format!(
                "Cohere API error ({}): {}",
                status, error_text
            )));
        }

        let parsed: CohereResponse = response
            .json()
            .await
            .map_err(|e| AppError::Rerank(format!("Failed to parse Cohere response: {}", e)))?;

        Ok(Self::convert_response(
            parsed,
            request.documents.len(),
            request.top_n,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_hits_are_dropped() {
        let raw: CohereResponse = serde_json::from_str(
            r#"{"results":[{"index":2,"relevance_score":0.9},{"index":7,"relevance_score":0.8},{"index":0,"relevance_score":0.1}]}"#,
        )
        .unwrap();

        let hits = CohereReranker::convert_response(raw, 3, 10);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].index, 2);
        assert_eq!(hits[1].index, 0);
    }

    #[tokio::test]
    async fn test_empty_documents_skip_the_call() {
        let reranker = CohereReranker::with_options("http://127.0.0.1:9", "key", DEFAULT_RERANK_MODEL, Some(1));
        let hits = reranker
            .rerank(&RerankRequest::new("q", Vec::new(), 5))
            .await
            .unwrap();
        assert!(hits.is_empty());
    }
}
