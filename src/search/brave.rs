// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Brave Search API provider
//!
//! Fallback behind Perplexity; good free tier, raw web results.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::provider::SearchProvider;
use super::types::{SearchError, SearchSnippet};

const BRAVE_API_URL: &str = "https://api.search.brave.com/res/v1/web/search";
const REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Brave Search API provider
pub struct BraveSearchProvider {
    api_key: String,
    client: Client,
}

impl BraveSearchProvider {
    /// Create a new Brave Search provider
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(REQUEST_TIMEOUT_MS))
            .build()
            .expect("Failed to create HTTP client");

        Self { api_key, client }
    }
}

#[async_trait]
impl SearchProvider for BraveSearchProvider {
    async fn search(
        &self,
        query: &str,
        num_results: usize,
    ) -> Result<Vec<SearchSnippet>, SearchError> {
        let count = num_results.min(20).to_string();
        let response = self
            .client
            .get(BRAVE_API_URL)
            .header("X-Subscription-Token", &self.api_key)
            .header("Accept", "application/json")
            .query(&[("q", query), ("count", count.as_str())])
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
                provider: "brave".to_string(),
            });
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let data: BraveResponse = response.json().await.map_err(|e| SearchError::ApiError {
            status: 0,
            message: format!("JSON parse error: {}", e),
        })?;

        Ok(data
            .web
            .results
            .into_iter()
            .map(|r| SearchSnippet {
                title: r.title,
                url: r.url,
                snippet: r.description,
                source: "brave".to_string(),
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "brave"
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn priority(&self) -> u8 {
        20
    }
}

#[derive(Debug, serde::Deserialize)]
struct BraveResponse {
    web: BraveWebResults,
}

#[derive(Debug, serde::Deserialize)]
struct BraveWebResults {
    results: Vec<BraveResult>,
}

#[derive(Debug, serde::Deserialize)]
struct BraveResult {
    title: String,
    url: String,
    description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let provider = BraveSearchProvider::new("test-api-key".to_string());
        assert_eq!(provider.name(), "brave");
        assert!(provider.is_available());
        assert_eq!(provider.priority(), 20);
    }

    #[test]
    fn test_provider_empty_key() {
        let provider = BraveSearchProvider::new(String::new());
        assert!(!provider.is_available());
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "web": {
                "results": [
                    {
                        "title": "Test Title",
                        "url": "https://example.com",
                        "description": "Test description"
                    }
                ]
            }
        }"#;

        let response: BraveResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.web.results.len(), 1);
        assert_eq!(response.web.results[0].title, "Test Title");
    }
}
