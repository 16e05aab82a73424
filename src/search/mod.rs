// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Web search augmentation
//!
//! Freshness-oriented snippets from external search backends, used to
//! supplement knowledge-base retrieval when the classifier asks for it.
//! Providers sit behind one trait with priority-ordered failover; results
//! are cached with a TTL and normalized into a single augmentation string.

pub mod brave;
pub mod cache;
pub mod config;
pub mod perplexity;
pub mod provider;
pub mod service;
pub mod types;

pub use config::{SearchConfig, SearchMode};
pub use provider::SearchProvider;
pub use service::SearchService;
pub use types::{format_snippets, SearchError, SearchSnippet};
