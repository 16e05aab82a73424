// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Knowledge-base retriever
//!
//! Composes the embedding provider and the vector index: embed the query,
//! take the top-k nearest passages by L2 distance, return their texts
//! nearest-first.

use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::embeddings::{EmbeddingError, EmbeddingProvider};
use crate::vector::{IndexError, VectorIndex};

/// Errors from a retrieval attempt
#[derive(Debug, Error)]
pub enum RetrieveError {
    /// The query embedding call failed
    #[error("Query embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    /// The index rejected the query vector
    #[error("Index query failed: {0}")]
    Index(#[from] IndexError),
}

/// Maps a query to the top-k associated knowledge texts
pub struct Retriever {
    embeddings: Arc<dyn EmbeddingProvider>,
    index: Arc<VectorIndex>,
}

impl Retriever {
    pub fn new(embeddings: Arc<dyn EmbeddingProvider>, index: Arc<VectorIndex>) -> Self {
        Self { embeddings, index }
    }

    /// Number of entries in the underlying index
    pub fn index_size(&self) -> usize {
        self.index.len()
    }

    /// Retrieve up to `top_k` passages for `query`, nearest first.
    ///
    /// `top_k` larger than the index is clamped to the index size. Embedding
    /// failures propagate; there is no internal retry — degrade-or-retry is
    /// the caller's decision.
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<String>, RetrieveError> {
        let embedding = self.embeddings.embed(query).await?;
        let results = self.index.search(&embedding, top_k)?;

        debug!(
            "Retrieved {} passages for query ({} requested)",
            results.len(),
            top_k
        );

        Ok(results
            .into_iter()
            .map(|(_, item)| item.text.clone())
            .collect())
    }
}
