// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Conversation store
//!
//! Shared map of user id to ordered message history. Entries are created
//! lazily on first contact and appended twice per completed turn (user
//! query, assistant reply). Eviction is explicit: idle entries expire after
//! a timeout, and a capacity cap evicts the longest-idle entry first.
//! Entries active within a short idle floor are never capacity-evicted;
//! a session mid-turn (its task awaiting a stream, not touching the store)
//! must not have its history reset underneath it, so the map may briefly
//! exceed the cap while every entry is fresh.
//!
//! Concurrency: the map lives behind one `RwLock`; each connection task only
//! mutates its own entry, so contention is limited to first-contact inserts
//! and the periodic eviction sweep.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::llm::ChatMessage;

/// Conversation store tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Maximum number of concurrent conversations
    pub max_sessions: usize,
    /// Seconds of inactivity before an entry may be evicted
    pub idle_timeout_secs: u64,
    /// Minimum idle seconds before the capacity cap may claim an entry
    pub eviction_idle_floor_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_sessions: 1000,
            idle_timeout_secs: 1800, // 30 minutes
            eviction_idle_floor_secs: 60,
        }
    }
}

struct Conversation {
    messages: Vec<ChatMessage>,
    last_activity: Instant,
}

/// Per-user ordered message history, shared across connection tasks
pub struct ConversationStore {
    config: StoreConfig,
    conversations: RwLock<HashMap<String, Conversation>>,
}

impl ConversationStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            conversations: RwLock::new(HashMap::new()),
        }
    }

    /// Append one message to a user's history, creating the entry on first
    /// contact. At capacity, the longest-idle entry past the idle floor is
    /// evicted; if every entry is fresher than the floor, the cap yields.
    pub async fn append(&self, user_id: &str, message: ChatMessage) {
        let mut conversations = self.conversations.write().await;

        if !conversations.contains_key(user_id) && conversations.len() >= self.config.max_sessions {
            let floor = Duration::from_secs(self.config.eviction_idle_floor_secs);
            let oldest = conversations
                .iter()
                .filter(|(_, c)| c.last_activity.elapsed() >= floor)
                .min_by_key(|(_, c)| c.last_activity)
                .map(|(id, _)| id.clone());
            if let Some(id) = oldest {
                conversations.remove(&id);
            }
        }

        let conversation = conversations
            .entry(user_id.to_string())
            .or_insert_with(|| Conversation {
                messages: Vec::new(),
                last_activity: Instant::now(),
            });

        conversation.messages.push(message);
        conversation.last_activity = Instant::now();
    }

    /// Snapshot of a user's history, oldest first; empty if unknown
    pub async fn history(&self, user_id: &str) -> Vec<ChatMessage> {
        let conversations = self.conversations.read().await;
        conversations
            .get(user_id)
            .map(|c| c.messages.clone())
            .unwrap_or_default()
    }

    /// Number of live conversations
    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remove entries idle longer than the configured timeout.
    ///
    /// Returns the number of evicted conversations.
    pub async fn evict_idle(&self) -> usize {
        let timeout = Duration::from_secs(self.config.idle_timeout_secs);
        let mut conversations = self.conversations.write().await;
        let before = conversations.len();
        conversations.retain(|_, c| c.last_activity.elapsed() <= timeout);
        before - conversations.len()
    }
}
