// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OpenAI embeddings client
//!
//! Calls the `/v1/embeddings` endpoint with `text-embedding-ada-002`
//! (1536 dimensions) by default.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::{EmbeddingError, EmbeddingProvider};

const EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";
const DEFAULT_MODEL: &str = "text-embedding-ada-002";
const DEFAULT_DIMENSION: usize = 1536;
const REQUEST_TIMEOUT_MS: u64 = 30_000;

/// OpenAI embeddings provider
pub struct OpenAiEmbeddings {
    api_key: String,
    model: String,
    dimension: usize,
    client: Client,
}

impl OpenAiEmbeddings {
    /// Create a provider for the default model (`text-embedding-ada-002`)
    pub fn new(api_key: String) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL.to_string(), DEFAULT_DIMENSION)
    }

    /// Create a provider for a specific model and dimension
    pub fn with_model(api_key: String, model: String, dimension: usize) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(REQUEST_TIMEOUT_MS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key,
            model,
            dimension,
            client,
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let body = json!({
            "input": [text],
            "model": self.model,
        });

        let response = self
            .client
            .post(EMBEDDINGS_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EmbeddingError::Timeout {
                        timeout_ms: REQUEST_TIMEOUT_MS,
                    }
                } else {
                    EmbeddingError::ApiError {
                        status: 0,
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let data: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        let vector = data
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| EmbeddingError::InvalidResponse("empty data array".to_string()))?;

        if vector.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_defaults() {
        let provider = OpenAiEmbeddings::new("test-key".to_string());
        assert_eq!(provider.dimension(), 1536);
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_custom_model() {
        let provider = OpenAiEmbeddings::with_model(
            "test-key".to_string(),
            "text-embedding-3-small".to_string(),
            1536,
        );
        assert_eq!(provider.dimension(), 1536);
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{"data":[{"embedding":[0.1,0.2,0.3]}]}"#;
        let response: EmbeddingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.data[0].embedding.len(), 3);
    }
}
