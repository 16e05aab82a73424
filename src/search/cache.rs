// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! TTL-based search result caching

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use super::types::SearchSnippet;

/// TTL-based cache for search results, keyed by normalized query
pub struct SearchCache {
    cache: RwLock<HashMap<String, CachedEntry>>,
    ttl: Duration,
    max_entries: usize,
}

struct CachedEntry {
    snippets: Vec<SearchSnippet>,
    provider: String,
    inserted_at: Instant,
}

impl SearchCache {
    /// Create a new cache with the given TTL and capacity
    pub fn new(ttl_secs: u64, max_entries: usize) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            ttl: Duration::from_secs(ttl_secs),
            max_entries,
        }
    }

    /// Get cached snippets for a query; None if absent or expired
    pub fn get(&self, query: &str) -> Option<(Vec<SearchSnippet>, String)> {
        let cache = self.cache.read().ok()?;
        let entry = cache.get(&Self::cache_key(query))?;

        if entry.inserted_at.elapsed() > self.ttl {
            return None;
        }

        Some((entry.snippets.clone(), entry.provider.clone()))
    }

    /// Insert snippets. Expired entries are purged first; only if the cache
    /// is still at capacity does the oldest live entry get evicted.
    pub fn insert(&self, query: &str, snippets: &[SearchSnippet], provider: &str) {
        let mut cache = match self.cache.write() {
            Ok(c) => c,
            Err(_) => return,
        };

        cache.retain(|_, e| e.inserted_at.elapsed() <= self.ttl);

        if cache.len() >= self.max_entries {
            let oldest = cache
                .iter()
                .min_by_key(|(_, e)| e.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(key) = oldest {
                cache.remove(&key);
            }
        }

        cache.insert(
            Self::cache_key(query),
            CachedEntry {
                snippets: snippets.to_vec(),
                provider: provider.to_string(),
                inserted_at: Instant::now(),
            },
        );
    }

    /// Number of entries currently held (expired entries linger until the
    /// next insert)
    pub fn len(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all entries
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }

    fn cache_key(query: &str) -> String {
        query.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snippet(text: &str) -> SearchSnippet {
        SearchSnippet {
            title: String::new(),
            url: "https://example.com".to_string(),
            snippet: text.to_string(),
            source: "test".to_string(),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let cache = SearchCache::new(3600, 10);
        cache.insert("query", &[snippet("hit")], "perplexity");

        let (snippets, provider) = cache.get("query").unwrap();
        assert_eq!(snippets[0].snippet, "hit");
        assert_eq!(provider, "perplexity");
    }

    #[test]
    fn test_key_normalization() {
        let cache = SearchCache::new(3600, 10);
        cache.insert("  What Is JetBay?  ", &[snippet("x")], "test");
        assert!(cache.get("what is jetbay?").is_some());
    }

    #[test]
    fn test_miss() {
        let cache = SearchCache::new(3600, 10);
        assert!(cache.get("unknown").is_none());
    }

    #[test]
    fn test_expiry() {
        let cache = SearchCache::new(0, 10);
        cache.insert("query", &[snippet("x")], "test");
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get("query").is_none());
    }

    #[test]
    fn test_insert_purges_expired_before_evicting() {
        let cache = SearchCache::new(0, 10);
        cache.insert("stale", &[snippet("old")], "test");
        std::thread::sleep(Duration::from_millis(5));

        // Well under capacity, yet the expired entry is dropped on insert
        cache.insert("fresh", &[snippet("new")], "test");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_capacity_eviction() {
        let cache = SearchCache::new(3600, 2);
        cache.insert("a", &[snippet("a")], "test");
        cache.insert("b", &[snippet("b")], "test");
        cache.insert("c", &[snippet("c")], "test");

        assert_eq!(cache.len(), 2);
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_clear() {
        let cache = SearchCache::new(3600, 10);
        cache.insert("query", &[snippet("x")], "test");
        cache.clear();
        assert!(cache.is_empty());
    }
}
