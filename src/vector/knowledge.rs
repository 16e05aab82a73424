// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Knowledge base item types

use serde::{Deserialize, Serialize};

/// Origin of a knowledge item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeSource {
    /// Extracted from a source document
    Doc,
    /// Built from a question/answer FAQ pair
    Faq,
    /// Anything else
    Other,
}

/// One item of the private knowledge base. Immutable once indexed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeItem {
    /// The passage text served as retrieval context
    pub text: String,
    /// Where the item came from
    pub source: KnowledgeSource,
}

impl KnowledgeItem {
    pub fn new(text: impl Into<String>, source: KnowledgeSource) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }
}
