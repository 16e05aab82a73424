// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Perplexity Search API provider
//!
//! Preferred provider: snippets come back pre-summarized, which reads well
//! when injected straight into the prompt.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::provider::SearchProvider;
use super::types::{SearchError, SearchSnippet};

const PERPLEXITY_API_URL: &str = "https://api.perplexity.ai/v1/search";
const REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Perplexity Search API provider
pub struct PerplexitySearchProvider {
    api_key: String,
    client: Client,
}

impl PerplexitySearchProvider {
    /// Create a new Perplexity provider
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(REQUEST_TIMEOUT_MS))
            .build()
            .expect("Failed to create HTTP client");

        Self { api_key, client }
    }
}

#[async_trait]
impl SearchProvider for PerplexitySearchProvider {
    async fn search(
        &self,
        query: &str,
        num_results: usize,
    ) -> Result<Vec<SearchSnippet>, SearchError> {
        let response = self
            .client
            .post(PERPLEXITY_API_URL)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "query": query,
                "limit": num_results,
            }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout {
                        timeout_ms: REQUEST_TIMEOUT_MS,
                    }
                } else {
                    SearchError::ApiError {
                        status: 0,
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();

        if status == 429 {
            return Err(SearchError::RateLimited {
                retry_after_secs: 60,
            });
        }

        if status == 401 || status == 403 {
            return Err(SearchError::NoApiKey {
                provider: "perplexity".to_string(),
            });
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let data: PerplexityResponse =
            response.json().await.map_err(|e| SearchError::ApiError {
                status: 0,
                message: format!("JSON parse error: {}", e),
            })?;

        Ok(data
            .results
            .into_iter()
            .map(|r| SearchSnippet {
                title: r.title.unwrap_or_default(),
                url: r.url,
                snippet: r.snippet,
                source: "perplexity".to_string(),
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "perplexity"
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn priority(&self) -> u8 {
        10 // Preferred provider
    }
}

#[derive(Debug, serde::Deserialize)]
struct PerplexityResponse {
    #[serde(default)]
    results: Vec<PerplexityResult>,
}

#[derive(Debug, serde::Deserialize)]
struct PerplexityResult {
    url: String,
    snippet: String,
    title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let provider = PerplexitySearchProvider::new("pplx-test".to_string());
        assert_eq!(provider.name(), "perplexity");
        assert!(provider.is_available());
        assert_eq!(provider.priority(), 10);
    }

    #[test]
    fn test_provider_empty_key() {
        let provider = PerplexitySearchProvider::new(String::new());
        assert!(!provider.is_available());
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "results": [
                {"url": "https://example.com", "snippet": "A summary", "title": "Example"}
            ]
        }"#;

        let response: PerplexityResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].snippet, "A summary");
    }

    #[test]
    fn test_response_missing_title() {
        let json = r#"{"results": [{"url": "https://example.com", "snippet": "s"}]}"#;
        let response: PerplexityResponse = serde_json::from_str(json).unwrap();
        assert!(response.results[0].title.is_none());
    }

    #[test]
    fn test_response_no_results() {
        let response: PerplexityResponse = serde_json::from_str("{}").unwrap();
        assert!(response.results.is_empty());
    }
}
