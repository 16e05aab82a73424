// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-connection chat session orchestration
//!
//! The core of the node: one `ChatSession` per WebSocket connection drives
//! the retrieve -> classify -> search -> prompt -> stream turn loop against
//! an abstract transport, with the shared `ConversationStore` holding each
//! user's history.

pub mod chat;
pub mod frame;
pub mod store;

pub use chat::{ChatSession, ChatTransport, SessionContext, SessionSettings, TransportError};
pub use frame::{StreamFrame, END_STREAM};
pub use store::{ConversationStore, StoreConfig};
