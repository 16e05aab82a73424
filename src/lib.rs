// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod embeddings;
pub mod llm;
pub mod rag;
pub mod search;
pub mod session;
pub mod vector;

// Re-export main types
pub use config::{ConfigError, NodeConfig};
pub use embeddings::{EmbeddingError, EmbeddingProvider, OpenAiEmbeddings};
pub use llm::{ChatError, ChatMessage, ChatProvider, OpenAiChat, Role, TokenStream};
pub use rag::{parse_decision, RetrieveError, Retriever, SearchClassifier};
pub use search::{SearchConfig, SearchError, SearchMode, SearchProvider, SearchService, SearchSnippet};
pub use session::{
    ChatSession, ChatTransport, ConversationStore, SessionContext, SessionSettings, StoreConfig,
    StreamFrame, TransportError, END_STREAM,
};
pub use vector::{IndexError, KnowledgeItem, KnowledgeSource, VectorIndex};
