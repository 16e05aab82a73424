// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for web search augmentation

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A normalized snippet from a web search provider.
///
/// Providers return different schemas; everything is normalized into this
/// shape before it reaches the session loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSnippet {
    /// Result title (may be empty for providers that return none)
    pub title: String,
    /// Result URL
    pub url: String,
    /// Snippet/summary text
    pub snippet: String,
    /// Provider that produced the snippet
    pub source: String,
}

/// Errors that can occur during search operations
#[derive(Debug, Error)]
pub enum SearchError {
    /// Rate limited by the search provider
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying
        retry_after_secs: u64,
    },

    /// API error from the search provider
    #[error("Search API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Search request timed out
    #[error("Search timeout after {timeout_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// No configured provider could serve the query
    #[error("Provider unavailable: {provider}")]
    ProviderUnavailable {
        /// Name of the unavailable provider ("all" when every one failed)
        provider: String,
    },

    /// No API key configured for the provider
    #[error("No API key configured for {provider}")]
    NoApiKey {
        /// Name of the provider missing an API key
        provider: String,
    },

    /// Web search is disabled by configuration
    #[error("Web search disabled")]
    SearchDisabled,
}

/// Format snippets into the augmentation string attached to the prompt.
///
/// One `Source:`/`Summary:` block per snippet, newline-separated.
pub fn format_snippets(snippets: &[SearchSnippet]) -> String {
    snippets
        .iter()
        .map(|s| format!("Source: {}\nSummary: {}\n", s.url, s.snippet))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snippet(url: &str, text: &str) -> SearchSnippet {
        SearchSnippet {
            title: String::new(),
            url: url.to_string(),
            snippet: text.to_string(),
            source: "test".to_string(),
        }
    }

    #[test]
    fn test_format_snippets() {
        let formatted = format_snippets(&[
            snippet("https://a.example", "first"),
            snippet("https://b.example", "second"),
        ]);

        assert!(formatted.contains("Source: https://a.example"));
        assert!(formatted.contains("Summary: first"));
        assert!(formatted.contains("Summary: second"));
        assert!(formatted.find("first").unwrap() < formatted.find("second").unwrap());
    }

    #[test]
    fn test_format_empty() {
        assert_eq!(format_snippets(&[]), "");
    }

    #[test]
    fn test_search_error_display() {
        let err = SearchError::RateLimited {
            retry_after_secs: 60,
        };
        assert!(err.to_string().contains("60"));
    }
}
