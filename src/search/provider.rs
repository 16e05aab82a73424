// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Search provider trait definition

use async_trait::async_trait;

use super::types::{SearchError, SearchSnippet};

/// Trait for web search providers.
///
/// Several backends implement this trait; the service tries them in
/// priority order with automatic failover.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Perform a web search
    ///
    /// # Arguments
    /// * `query` - The search query string
    /// * `num_results` - Maximum number of snippets to return
    async fn search(
        &self,
        query: &str,
        num_results: usize,
    ) -> Result<Vec<SearchSnippet>, SearchError>;

    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Whether the provider can currently serve queries (API key present)
    fn is_available(&self) -> bool;

    /// Provider priority (lower = preferred). Defaults to 100.
    fn priority(&self) -> u8 {
        100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockProvider;

    #[async_trait]
    impl SearchProvider for MockProvider {
        async fn search(
            &self,
            query: &str,
            _num_results: usize,
        ) -> Result<Vec<SearchSnippet>, SearchError> {
            Ok(vec![SearchSnippet {
                title: format!("Result for {}", query),
                url: "https://example.com".to_string(),
                snippet: "A mock result".to_string(),
                source: "mock".to_string(),
            }])
        }

        fn name(&self) -> &'static str {
            "mock"
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_default_priority() {
        assert_eq!(MockProvider.priority(), 100);
    }

    #[tokio::test]
    async fn test_mock_provider_search() {
        let results = MockProvider.search("test", 5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].title.contains("test"));
    }
}
