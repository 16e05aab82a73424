// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Search necessity classifier
//!
//! One constrained LLM call per turn deciding whether live web search should
//! supplement retrieval. The reply parsing is deliberately lenient: the
//! decision is positive iff "YES" appears anywhere in the reply,
//! case-insensitively. That leniency is isolated in `parse_decision` so it
//! stays an explicit, tested contract.

use std::sync::Arc;
use tracing::warn;

use crate::llm::{ChatError, ChatMessage, ChatProvider};

const EVALUATION_PROMPT: &str = "\
You are an AI assistant tasked with determining if a query requires real-time or up-to-date information.
Evaluate if the query needs online search based on these criteria:
1. If the query asks about current events, news, or time-sensitive information
2. If the query is about recent developments or changes
3. If the query requires very specific or technical information not commonly found in general knowledge
4. If the query asks about prices, availability, or status of things that change frequently

Respond with only \"YES\" if online search is needed, or \"NO\" if not needed.";

const EVALUATION_TEMPERATURE: f32 = 0.3;

/// Parse a classifier reply into a search decision.
///
/// Returns true iff the literal token "YES" appears anywhere in the reply,
/// case-insensitively. A reply like "yes, search is needed" counts.
pub fn parse_decision(reply: &str) -> bool {
    reply.to_uppercase().contains("YES")
}

/// Decides per turn whether web search should supplement retrieval
pub struct SearchClassifier {
    chat: Arc<dyn ChatProvider>,
}

impl SearchClassifier {
    pub fn new(chat: Arc<dyn ChatProvider>) -> Self {
        Self { chat }
    }

    /// Issue the classification call and parse the decision.
    ///
    /// Fallible variant used by tests; production code goes through
    /// `needs_web_search` which applies the safe default.
    pub async fn decide(&self, query: &str, context: &[String]) -> Result<bool, ChatError> {
        let messages = vec![
            ChatMessage::system(EVALUATION_PROMPT),
            ChatMessage::user(format!(
                "Based on the retrieved context and the query, does this question require online search? Query: {}\nContext: {}",
                query,
                context.join("\n")
            )),
        ];

        let reply = self.chat.complete(&messages, EVALUATION_TEMPERATURE).await?;
        Ok(parse_decision(&reply))
    }

    /// Safe wrapper: on any provider failure the answer is "no search",
    /// logged but never surfaced to the user.
    pub async fn needs_web_search(&self, query: &str, context: &[String]) -> bool {
        match self.decide(query, context).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!(
                    provider = self.chat.name(),
                    error = %e,
                    "Search classification failed, defaulting to no search"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScriptedChat {
        reply: Option<String>,
    }

    #[async_trait::async_trait]
    impl ChatProvider for ScriptedChat {
        async fn complete(
            &self,
            _messages: &[ChatMessage],
            _temperature: f32,
        ) -> Result<String, ChatError> {
            match &self.reply {
                Some(reply) => Ok(reply.clone()),
                None => Err(ChatError::Timeout { timeout_ms: 1000 }),
            }
        }

        async fn stream(
            &self,
            _messages: &[ChatMessage],
            _temperature: f32,
        ) -> Result<crate::llm::TokenStream, ChatError> {
            Err(ChatError::InvalidResponse("not used".to_string()))
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    #[test]
    fn test_parse_decision_exact() {
        assert!(parse_decision("YES"));
        assert!(!parse_decision("NO"));
    }

    #[test]
    fn test_parse_decision_case_insensitive() {
        assert!(parse_decision("yes"));
        assert!(parse_decision("Yes."));
    }

    #[test]
    fn test_parse_decision_substring() {
        assert!(parse_decision("I think YES, a search would help"));
        assert!(parse_decision("yesterday")); // lenient by contract
        assert!(!parse_decision("Absolutely not"));
        assert!(!parse_decision(""));
    }

    #[tokio::test]
    async fn test_decide_positive() {
        let classifier = SearchClassifier::new(Arc::new(ScriptedChat {
            reply: Some("YES".to_string()),
        }));
        assert!(classifier.decide("query", &[]).await.unwrap());
    }

    #[tokio::test]
    async fn test_decide_negative() {
        let classifier = SearchClassifier::new(Arc::new(ScriptedChat {
            reply: Some("NO".to_string()),
        }));
        assert!(!classifier.decide("query", &[]).await.unwrap());
    }

    #[tokio::test]
    async fn test_failure_defaults_to_no_search() {
        let classifier = SearchClassifier::new(Arc::new(ScriptedChat { reply: None }));
        assert!(!classifier.needs_web_search("query", &[]).await);
    }
}
