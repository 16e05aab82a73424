// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OpenAI chat completions client
//!
//! Implements `ChatProvider` against the `/v1/chat/completions` endpoint.
//! Non-streaming calls are used by the search classifier; streaming calls
//! (SSE over a chunked response body) drive the answer stream.

use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

use super::{ChatError, ChatMessage, ChatProvider, TokenStream};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const REQUEST_TIMEOUT_MS: u64 = 120_000;

/// OpenAI chat completions provider
pub struct OpenAiChat {
    api_key: String,
    model: String,
    client: Client,
}

impl OpenAiChat {
    /// Create a new client for the given model (e.g. "gpt-4o")
    pub fn new(api_key: String, model: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(REQUEST_TIMEOUT_MS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key,
            model,
            client,
        }
    }

    async fn post(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        stream: bool,
    ) -> Result<reqwest::Response, ChatError> {
        let body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": temperature,
            "stream": stream,
        });

        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatError::Timeout {
                        timeout_ms: REQUEST_TIMEOUT_MS,
                    }
                } else {
                    ChatError::ApiError {
                        status: 0,
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ChatError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

#[async_trait::async_trait]
impl ChatProvider for OpenAiChat {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, ChatError> {
        let response = self.post(messages, temperature, false).await?;

        let data: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatError::InvalidResponse(e.to_string()))?;

        data.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ChatError::InvalidResponse("empty choices array".to_string()))
    }

    async fn stream(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<TokenStream, ChatError> {
        let response = self.post(messages, temperature, true).await?;

        let (tx, rx) = mpsc::channel::<Result<String, ChatError>>(32);

        tokio::spawn(async move {
            let mut body = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk) = body.next().await {
                let bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        let _ = tx.send(Err(ChatError::Stream(e.to_string()))).await;
                        return;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&bytes));

                // SSE frames are newline-delimited "data: <json>" lines
                while let Some(pos) = buffer.find('\n') {
                    let line = buffer[..pos].trim().to_string();
                    buffer.drain(..=pos);

                    let Some(payload) = line.strip_prefix("data: ") else {
                        continue;
                    };

                    if payload == "[DONE]" {
                        return;
                    }

                    match serde_json::from_str::<StreamChunk>(payload) {
                        Ok(chunk) => {
                            let token = chunk
                                .choices
                                .into_iter()
                                .next()
                                .and_then(|c| c.delta.content);
                            if let Some(token) = token {
                                if tx.send(Ok(token)).await.is_err() {
                                    // Receiver dropped, stop reading
                                    return;
                                }
                            }
                        }
                        Err(e) => {
                            debug!("Skipping unparseable stream chunk: {}", e);
                        }
                    }
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let provider = OpenAiChat::new("test-key".to_string(), "gpt-4o".to_string());
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_completion_response_deserialization() {
        let json = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "Hello there"}}
            ]
        }"#;

        let response: CompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices[0].message.content, "Hello there");
    }

    #[test]
    fn test_stream_chunk_deserialization() {
        let json = r#"{"choices":[{"delta":{"content":"Hel"}}]}"#;
        let chunk: StreamChunk = serde_json::from_str(json).unwrap();
        assert_eq!(chunk.choices[0].delta.content.as_deref(), Some("Hel"));
    }

    #[test]
    fn test_stream_chunk_empty_delta() {
        // Final chunks carry a finish_reason and no delta content
        let json = r#"{"choices":[{"delta":{}}]}"#;
        let chunk: StreamChunk = serde_json::from_str(json).unwrap();
        assert!(chunk.choices[0].delta.content.is_none());
    }
}
