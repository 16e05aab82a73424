// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration
//!
//! All configuration comes from environment variables read once at startup.
//! Missing credentials or index files are fatal before the server binds;
//! the node never serves traffic in a silently degraded configuration.

use std::env;
use std::path::PathBuf;
use thiserror::Error;

use crate::search::SearchConfig;
use crate::session::StoreConfig;

/// Configuration errors, all fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set
    #[error("Missing required environment variable: {var}")]
    MissingEnv {
        /// Variable name
        var: &'static str,
    },

    /// An environment variable has an unusable value
    #[error("Invalid value for {var}: {reason}")]
    InvalidEnv {
        /// Variable name
        var: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// A required file does not exist
    #[error("Required file not found: {path}")]
    MissingFile {
        /// File path
        path: String,
    },
}

/// Top-level node configuration
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// OpenAI API key, used for embeddings and chat completions
    pub openai_api_key: String,
    /// Chat model for classification and answers
    pub chat_model: String,
    /// Port the HTTP/WebSocket server binds to
    pub api_port: u16,
    /// Knowledge base JSON file
    pub knowledge_base_path: PathBuf,
    /// Binary vector index file
    pub vector_index_path: PathBuf,
    /// Passages retrieved per turn
    pub retrieve_top_k: usize,
    /// Web search configuration
    pub search: SearchConfig,
    /// Conversation store configuration
    pub store: StoreConfig,
}

impl NodeConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let openai_api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingEnv {
                var: "OPENAI_API_KEY",
            })?;

        let api_port = match env::var("API_PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidEnv {
                var: "API_PORT",
                reason: format!("'{}' is not a valid port", raw),
            })?,
            Err(_) => 8001,
        };

        let retrieve_top_k = match env::var("RETRIEVE_TOP_K") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidEnv {
                var: "RETRIEVE_TOP_K",
                reason: format!("'{}' is not a valid count", raw),
            })?,
            Err(_) => 3,
        };

        let search = SearchConfig::from_env().map_err(|reason| ConfigError::InvalidEnv {
            var: "SEARCH_MODE",
            reason,
        })?;
        search.validate().map_err(|reason| ConfigError::InvalidEnv {
            var: "SEARCH_MODE",
            reason,
        })?;

        let store = StoreConfig {
            max_sessions: env::var("STORE_MAX_SESSIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            idle_timeout_secs: env::var("STORE_IDLE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1800),
            eviction_idle_floor_secs: env::var("STORE_EVICTION_IDLE_FLOOR_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        };

        Ok(Self {
            openai_api_key,
            chat_model: env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            api_port,
            knowledge_base_path: env::var("KNOWLEDGE_BASE_PATH")
                .unwrap_or_else(|_| "knowledge_base_data.json".to_string())
                .into(),
            vector_index_path: env::var("VECTOR_INDEX_PATH")
                .unwrap_or_else(|_| "jetbay.index".to_string())
                .into(),
            retrieve_top_k,
            search,
            store,
        })
    }

    /// Check that the index file pair exists on disk.
    pub fn validate_files(&self) -> Result<(), ConfigError> {
        for path in [&self.knowledge_base_path, &self.vector_index_path] {
            if !path.exists() {
                return Err(ConfigError::MissingFile {
                    path: path.display().to_string(),
                });
            }
        }
        Ok(())
    }
}
