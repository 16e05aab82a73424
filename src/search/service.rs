// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Search service orchestration
//!
//! Coordinates providers, caching, and failover. Providers are tried in
//! priority order; the first available one that succeeds wins.

use std::time::Instant;
use tracing::{debug, info, warn};

use super::brave::BraveSearchProvider;
use super::cache::SearchCache;
use super::config::{SearchConfig, SearchMode};
use super::perplexity::PerplexitySearchProvider;
use super::provider::SearchProvider;
use super::types::{SearchError, SearchSnippet};

/// Orchestrates search providers with caching and priority failover
pub struct SearchService {
    providers: Vec<Box<dyn SearchProvider>>,
    cache: SearchCache,
    config: SearchConfig,
}

impl SearchService {
    /// Create a service from configuration, registering every provider
    /// that has credentials.
    pub fn new(config: SearchConfig) -> Self {
        let mut providers: Vec<Box<dyn SearchProvider>> = Vec::new();

        if let Some(ref api_key) = config.perplexity_api_key {
            if !api_key.is_empty() {
                providers.push(Box::new(PerplexitySearchProvider::new(api_key.clone())));
                debug!("Perplexity search provider enabled");
            }
        }

        if let Some(ref api_key) = config.brave_api_key {
            if !api_key.is_empty() {
                providers.push(Box::new(BraveSearchProvider::new(api_key.clone())));
                debug!("Brave search provider enabled");
            }
        }

        providers.sort_by_key(|p| p.priority());

        let cache = SearchCache::new(config.cache_ttl_secs, 1000);

        Self {
            providers,
            cache,
            config,
        }
    }

    /// Build a service with explicit providers (used by tests)
    pub fn with_providers(config: SearchConfig, mut providers: Vec<Box<dyn SearchProvider>>) -> Self {
        providers.sort_by_key(|p| p.priority());
        let cache = SearchCache::new(config.cache_ttl_secs, 1000);
        Self {
            providers,
            cache,
            config,
        }
    }

    /// Perform a search, trying providers in priority order.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchSnippet>, SearchError> {
        if self.config.mode == SearchMode::Never {
            return Err(SearchError::SearchDisabled);
        }

        if let Some((snippets, provider)) = self.cache.get(query) {
            debug!("Search cache hit via {} for query: {}", provider, query);
            return Ok(snippets);
        }

        let start = Instant::now();

        for provider in &self.providers {
            if !provider.is_available() {
                continue;
            }

            debug!("Trying search provider: {}", provider.name());

            match provider.search(query, self.config.num_results).await {
                Ok(snippets) => {
                    self.cache.insert(query, &snippets, provider.name());

                    info!(
                        "Search complete: {} snippets from {} in {}ms",
                        snippets.len(),
                        provider.name(),
                        start.elapsed().as_millis()
                    );

                    return Ok(snippets);
                }
                Err(e) => {
                    warn!(
                        "Search provider {} failed: {}, trying next",
                        provider.name(),
                        e
                    );
                    continue;
                }
            }
        }

        Err(SearchError::ProviderUnavailable {
            provider: "all".to_string(),
        })
    }

    /// Whether at least one provider can serve queries
    pub fn is_available(&self) -> bool {
        self.config.mode != SearchMode::Never && self.providers.iter().any(|p| p.is_available())
    }

    /// Configured search mode
    pub fn mode(&self) -> SearchMode {
        self.config.mode
    }

    /// Names of currently available providers
    pub fn available_providers(&self) -> Vec<&str> {
        self.providers
            .iter()
            .filter(|p| p.is_available())
            .map(|p| p.name())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FlakyProvider {
        name: &'static str,
        priority: u8,
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SearchProvider for FlakyProvider {
        async fn search(
            &self,
            _query: &str,
            _num_results: usize,
        ) -> Result<Vec<SearchSnippet>, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SearchError::ApiError {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(vec![SearchSnippet {
                title: String::new(),
                url: format!("https://{}.example", self.name),
                snippet: "snippet".to_string(),
                source: self.name.to_string(),
            }])
        }

        fn name(&self) -> &'static str {
            self.name
        }

        fn is_available(&self) -> bool {
            true
        }

        fn priority(&self) -> u8 {
            self.priority
        }
    }

    #[tokio::test]
    async fn test_failover_to_next_provider() {
        let first_calls = Arc::new(AtomicUsize::new(0));
        let second_calls = Arc::new(AtomicUsize::new(0));

        let service = SearchService::with_providers(
            SearchConfig::default(),
            vec![
                Box::new(FlakyProvider {
                    name: "second",
                    priority: 20,
                    fail: false,
                    calls: second_calls.clone(),
                }),
                Box::new(FlakyProvider {
                    name: "first",
                    priority: 10,
                    fail: true,
                    calls: first_calls.clone(),
                }),
            ],
        );

        let snippets = service.search("query").await.unwrap();
        assert_eq!(snippets[0].source, "second");
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_prevents_second_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = SearchService::with_providers(
            SearchConfig::default(),
            vec![Box::new(FlakyProvider {
                name: "only",
                priority: 10,
                fail: false,
                calls: calls.clone(),
            })],
        );

        service.search("same query").await.unwrap();
        service.search("same query").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_all_providers_failing() {
        let service = SearchService::with_providers(
            SearchConfig::default(),
            vec![Box::new(FlakyProvider {
                name: "only",
                priority: 10,
                fail: true,
                calls: Arc::new(AtomicUsize::new(0)),
            })],
        );

        let err = service.search("query").await.unwrap_err();
        assert!(matches!(err, SearchError::ProviderUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_mode_never_disables_search() {
        let mut config = SearchConfig::default();
        config.mode = SearchMode::Never;
        let service = SearchService::with_providers(config, vec![]);

        let err = service.search("query").await.unwrap_err();
        assert!(matches!(err, SearchError::SearchDisabled));
        assert!(!service.is_available());
    }

    #[test]
    fn test_no_providers_not_available() {
        let service = SearchService::new(SearchConfig::default());
        assert!(!service.is_available());
        assert!(service.available_providers().is_empty());
    }
}
