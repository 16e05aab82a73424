// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Chat session state machine
//!
//! One session per connection. Each turn: await input, retrieve knowledge,
//! optionally classify and web-search, assemble the prompt, and relay the
//! token stream to the transport. Provider failures degrade the turn;
//! transport failures close the session.
//!
//! Prompt ordering contract: persona system message, retrieved-context
//! system message, optional web-results system message, then the full prior
//! history oldest-first. The new user query is recorded into history before
//! assembly, so it rides inside the history segment.

use futures::StreamExt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::llm::{ChatMessage, ChatProvider};
use crate::rag::{Retriever, SearchClassifier};
use crate::search::{format_snippets, SearchMode, SearchService};

use super::frame::StreamFrame;
use super::store::ConversationStore;

const SYSTEM_PROMPT: &str = "\
You are a JetBay intelligent assistant tasked with answering user queries.
Provide precise, relevant, and natural responses based on the available information.
Do not mention the source of your information in your response.";

/// Errors at the transport boundary; any of these ends the session
#[derive(Debug, Error)]
pub enum TransportError {
    /// The peer disconnected
    #[error("Transport closed")]
    Closed,

    /// Protocol-level failure on receive or send
    #[error("Transport error: {0}")]
    Protocol(String),
}

/// One bidirectional text-message stream toward a single user.
///
/// `recv` returns `None` on orderly disconnect; errors on either side are
/// terminal for the session.
#[async_trait::async_trait]
pub trait ChatTransport: Send {
    /// Await the next text message from the client
    async fn recv(&mut self) -> Option<Result<String, TransportError>>;

    /// Send one frame to the client
    async fn send(&mut self, frame: StreamFrame) -> Result<(), TransportError>;
}

/// Session tunables
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Passages retrieved per turn
    pub retrieve_top_k: usize,
    /// Sampling temperature for the answer stream
    pub answer_temperature: f32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            retrieve_top_k: 3,
            answer_temperature: 0.7,
        }
    }
}

/// Shared collaborators injected into every session.
///
/// Everything here is read-only or internally synchronized, so one instance
/// is shared across all connection tasks.
pub struct SessionContext {
    pub store: Arc<ConversationStore>,
    pub retriever: Arc<Retriever>,
    pub classifier: SearchClassifier,
    pub search: Arc<SearchService>,
    pub chat: Arc<dyn ChatProvider>,
    pub settings: SessionSettings,
}

/// A retrieval-augmented streaming chat session for one connection
pub struct ChatSession {
    user_id: String,
    ctx: Arc<SessionContext>,
}

impl ChatSession {
    pub fn new(user_id: impl Into<String>, ctx: Arc<SessionContext>) -> Self {
        Self {
            user_id: user_id.into(),
            ctx,
        }
    }

    /// Drive the session until the transport closes.
    ///
    /// Turns are strictly sequential within one connection. Provider
    /// failures never escape a turn; only transport failures end the loop.
    pub async fn run<T: ChatTransport>(&self, transport: &mut T) {
        info!(user_id = %self.user_id, "Chat session opened");

        loop {
            let query = match transport.recv().await {
                Some(Ok(text)) => text,
                Some(Err(e)) => {
                    warn!(user_id = %self.user_id, error = %e, "Transport error, closing session");
                    break;
                }
                None => {
                    info!(user_id = %self.user_id, "Client disconnected");
                    break;
                }
            };

            if let Err(e) = self.run_turn(transport, query).await {
                warn!(user_id = %self.user_id, error = %e, "Send failed mid-turn, closing session");
                break;
            }
        }

        info!(user_id = %self.user_id, "Chat session closed");
    }

    /// Execute one turn. Returns an error only for transport failures.
    async fn run_turn<T: ChatTransport>(
        &self,
        transport: &mut T,
        query: String,
    ) -> Result<(), TransportError> {
        // Retrieval failure degrades to an empty context; the knowledge
        // base being unreachable must not take the session down.
        let context = match self
            .ctx
            .retriever
            .search(&query, self.ctx.settings.retrieve_top_k)
            .await
        {
            Ok(context) => context,
            Err(e) => {
                warn!(
                    user_id = %self.user_id,
                    error = %e,
                    "Retrieval failed, continuing without knowledge context"
                );
                Vec::new()
            }
        };

        let augmentation = self.web_augmentation(&query, &context).await;

        // Recorded before prompt assembly so the query is part of the
        // history segment rather than a separate trailing message.
        self.ctx
            .store
            .append(&self.user_id, ChatMessage::user(&query))
            .await;
        let history = self.ctx.store.history(&self.user_id).await;

        let messages = build_prompt(&context, augmentation.as_deref(), &history);

        let reply = self.stream_reply(transport, &messages).await?;

        if let Some(reply) = reply {
            self.ctx
                .store
                .append(&self.user_id, ChatMessage::assistant(reply))
                .await;
        }

        transport.send(StreamFrame::End).await
    }

    /// Decide on and fetch web augmentation for this turn.
    ///
    /// Any failure along the way degrades to no augmentation.
    async fn web_augmentation(&self, query: &str, context: &[String]) -> Option<String> {
        let wanted = match self.ctx.search.mode() {
            SearchMode::Never => false,
            SearchMode::Always => true,
            SearchMode::Auto => {
                // Skip the classifier call entirely when no provider could
                // serve the search anyway.
                self.ctx.search.is_available()
                    && self.ctx.classifier.needs_web_search(query, context).await
            }
        };

        if !wanted {
            return None;
        }

        match self.ctx.search.search(query).await {
            Ok(snippets) if !snippets.is_empty() => Some(format_snippets(&snippets)),
            Ok(_) => None,
            Err(e) => {
                warn!(user_id = %self.user_id, error = %e, "Web search failed, continuing without it");
                None
            }
        }
    }

    /// Relay the model stream to the transport, accumulating the full reply.
    ///
    /// Returns `Ok(Some(reply))` when the stream completed, `Ok(None)` when
    /// it failed mid-flight (error notice already sent; the caller still
    /// emits the end frame and the session survives).
    async fn stream_reply<T: ChatTransport>(
        &self,
        transport: &mut T,
        messages: &[ChatMessage],
    ) -> Result<Option<String>, TransportError> {
        let mut stream = match self
            .ctx
            .chat
            .stream(messages, self.ctx.settings.answer_temperature)
            .await
        {
            Ok(stream) => stream,
            Err(e) => {
                warn!(user_id = %self.user_id, error = %e, "Failed to start completion stream");
                transport.send(StreamFrame::Error(e.to_string())).await?;
                return Ok(None);
            }
        };

        let mut reply = String::new();

        while let Some(item) = stream.next().await {
            match item {
                Ok(token) => {
                    transport.send(StreamFrame::Token(token.clone())).await?;
                    reply.push_str(&token);
                }
                Err(e) => {
                    warn!(user_id = %self.user_id, error = %e, "Completion stream failed mid-flight");
                    transport.send(StreamFrame::Error(e.to_string())).await?;
                    return Ok(None);
                }
            }
        }

        Ok(Some(reply))
    }
}

/// Assemble the model input for one turn.
///
/// Ordering: persona, retrieved context, optional web augmentation, then the
/// full prior history oldest-first (which already ends with the new query).
fn build_prompt(
    context: &[String],
    augmentation: Option<&str>,
    history: &[ChatMessage],
) -> Vec<ChatMessage> {
    let mut messages = vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::system(format!("Context: {}", context.join("\n\n"))),
    ];

    if let Some(augmentation) = augmentation {
        messages.push(ChatMessage::system(format!(
            "Additional Information: {}",
            augmentation
        )));
    }

    messages.extend_from_slice(history);
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    #[test]
    fn test_prompt_ordering_without_augmentation() {
        let history = vec![ChatMessage::user("What is JetBay?")];
        let messages = build_prompt(&["passage one".to_string()], None, &history);

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.contains("JetBay intelligent assistant"));
        assert!(messages[1].content.starts_with("Context: passage one"));
        assert_eq!(messages[2].role, Role::User);
    }

    #[test]
    fn test_prompt_ordering_with_augmentation() {
        let history = vec![
            ChatMessage::user("earlier question"),
            ChatMessage::assistant("earlier answer"),
            ChatMessage::user("new question"),
        ];
        let messages = build_prompt(
            &["passage".to_string()],
            Some("Source: https://example.com\nSummary: fresh"),
            &history,
        );

        assert_eq!(messages.len(), 6);
        assert!(messages[2].content.starts_with("Additional Information:"));
        // History is appended after the system block, oldest first
        assert_eq!(messages[3].content, "earlier question");
        assert_eq!(messages[5].content, "new question");
    }

    #[test]
    fn test_prompt_with_empty_context() {
        let messages = build_prompt(&[], None, &[ChatMessage::user("q")]);
        assert_eq!(messages[1].content, "Context: ");
    }
}
