// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for web search augmentation

use std::env;
use std::str::FromStr;

/// When web search supplements retrieval.
///
/// The historical service variants (always-search, classifier-gated, no
/// search) are consolidated behind this one switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Ask the classifier each turn
    #[default]
    Auto,
    /// Search on every turn, skipping the classifier
    Always,
    /// Never search
    Never,
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(SearchMode::Auto),
            "always" => Ok(SearchMode::Always),
            "never" => Ok(SearchMode::Never),
            other => Err(format!(
                "invalid search mode '{}', expected auto|always|never",
                other
            )),
        }
    }
}

/// Configuration for web search augmentation
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// When search runs relative to the classifier
    pub mode: SearchMode,
    /// Perplexity API key
    pub perplexity_api_key: Option<String>,
    /// Brave Search API key
    pub brave_api_key: Option<String>,
    /// Cache TTL in seconds
    pub cache_ttl_secs: u64,
    /// Snippets requested per search
    pub num_results: usize,
}

impl SearchConfig {
    /// Load configuration from environment variables.
    ///
    /// `SEARCH_MODE` errors are returned rather than silently defaulted so a
    /// typo does not flip the search behavior.
    pub fn from_env() -> Result<Self, String> {
        let mode = match env::var("SEARCH_MODE") {
            Ok(raw) => raw.parse()?,
            Err(_) => SearchMode::default(),
        };

        Ok(Self {
            mode,
            perplexity_api_key: env::var("PERPLEXITY_API_KEY").ok(),
            brave_api_key: env::var("BRAVE_API_KEY").ok(),
            cache_ttl_secs: env::var("SEARCH_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            num_results: env::var("SEARCH_NUM_RESULTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
        })
    }

    /// Check if any search provider has credentials
    pub fn has_any_provider(&self) -> bool {
        self.perplexity_api_key.as_deref().is_some_and(|k| !k.is_empty())
            || self.brave_api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Validate mode/provider consistency.
    ///
    /// `Always` with no provider is a configuration error; `Auto` degrades
    /// to no search at runtime and only warrants a warning at startup.
    pub fn validate(&self) -> Result<(), String> {
        if self.mode == SearchMode::Always && !self.has_any_provider() {
            return Err(
                "SEARCH_MODE=always but no search provider API key is configured".to_string(),
            );
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::Auto,
            perplexity_api_key: None,
            brave_api_key: None,
            cache_ttl_secs: 3600,
            num_results: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("auto".parse::<SearchMode>().unwrap(), SearchMode::Auto);
        assert_eq!("ALWAYS".parse::<SearchMode>().unwrap(), SearchMode::Always);
        assert_eq!("Never".parse::<SearchMode>().unwrap(), SearchMode::Never);
        assert!("sometimes".parse::<SearchMode>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert_eq!(config.mode, SearchMode::Auto);
        assert_eq!(config.num_results, 5);
        assert!(!config.has_any_provider());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_has_any_provider() {
        let mut config = SearchConfig::default();
        config.perplexity_api_key = Some("pplx-key".to_string());
        assert!(config.has_any_provider());

        config.perplexity_api_key = Some(String::new());
        assert!(!config.has_any_provider());
    }

    #[test]
    fn test_always_without_provider_is_invalid() {
        let mut config = SearchConfig::default();
        config.mode = SearchMode::Always;
        assert!(config.validate().is_err());

        config.brave_api_key = Some("key".to_string());
        assert!(config.validate().is_ok());
    }
}
