// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text embedding abstractions
//!
//! The embedding provider converts text into a fixed-dimension float vector.
//! Providers are stateless and safe to share across connection tasks.

use thiserror::Error;

pub mod openai;

pub use openai::OpenAiEmbeddings;

/// Errors from embedding calls
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// API error from the embedding provider
    #[error("Embedding API error: {status} - {message}")]
    ApiError {
        /// HTTP status code (0 for connection-level failures)
        status: u16,
        /// Error message
        message: String,
    },

    /// Request timed out
    #[error("Embedding request timeout after {timeout_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// Response did not have the expected shape
    #[error("Invalid embedding response: {0}")]
    InvalidResponse(String),

    /// Returned vector has the wrong dimension
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension returned
        actual: usize,
    },
}

/// Trait for embedding providers
///
/// Implementations do not retry internally; retry policy belongs to callers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text into a fixed-dimension vector
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Dimension of vectors produced by this provider
    fn dimension(&self) -> usize;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_error_display() {
        let err = EmbeddingError::DimensionMismatch {
            expected: 1536,
            actual: 384,
        };
        assert!(err.to_string().contains("1536"));
        assert!(err.to_string().contains("384"));
    }
}
