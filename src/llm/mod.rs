// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Language-model client abstractions
//!
//! Defines the `ChatProvider` trait used for both the single-shot classifier
//! call and the streamed answer generation, plus the chat message types
//! shared across the node.

use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use thiserror::Error;

pub mod openai;

pub use openai::OpenAiChat;

/// Role of a chat message, serialized lowercase for the chat API wire format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in an ordered conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Errors from chat completion calls
#[derive(Debug, Error)]
pub enum ChatError {
    /// API error from the chat provider
    #[error("Chat API error: {status} - {message}")]
    ApiError {
        /// HTTP status code (0 for connection-level failures)
        status: u16,
        /// Error message
        message: String,
    },

    /// Request timed out
    #[error("Chat request timeout after {timeout_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// Response did not have the expected shape
    #[error("Invalid chat response: {0}")]
    InvalidResponse(String),

    /// The token stream failed mid-flight
    #[error("Stream error: {0}")]
    Stream(String),
}

/// A lazily-produced token stream with an explicit error variant.
///
/// The stream ends when the provider signals completion; errors are stream
/// items rather than panics so the session loop can degrade gracefully.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, ChatError>> + Send>>;

/// Trait for chat completion providers
///
/// One implementation talks to the real chat API; tests use scripted
/// implementations to drive the session loop deterministically.
#[async_trait::async_trait]
pub trait ChatProvider: Send + Sync {
    /// Run a single blocking completion and return the full reply text
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, ChatError>;

    /// Run a streaming completion, yielding tokens in emission order
    async fn stream(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<TokenStream, ChatError>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn test_message_constructors() {
        let msg = ChatMessage::user("hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "hello");

        let msg = ChatMessage::assistant("hi");
        assert_eq!(msg.role, Role::Assistant);
    }

    #[test]
    fn test_message_wire_format() {
        let msg = ChatMessage::system("context");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"role":"system","content":"context"}"#);
    }

    #[test]
    fn test_chat_error_display() {
        let err = ChatError::ApiError {
            status: 429,
            message: "rate limited".to_string(),
        };
        assert!(err.to_string().contains("429"));

        let err = ChatError::Timeout { timeout_ms: 30000 };
        assert!(err.to_string().contains("30000"));
    }
}
