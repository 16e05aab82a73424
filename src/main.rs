// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use jetbay_rag_node::{
    api::start_server,
    config::NodeConfig,
    llm::{ChatProvider, OpenAiChat},
    rag::{Retriever, SearchClassifier},
    search::{SearchMode, SearchService},
    session::{ConversationStore, SessionContext, SessionSettings},
    vector::load_index,
    OpenAiEmbeddings,
};
use std::{env, sync::Arc};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = NodeConfig::from_env().context("Failed to load configuration")?;
    config
        .validate_files()
        .context("Index files missing; run the build-index binary first")?;

    let index = load_index(&config.vector_index_path, &config.knowledge_base_path)
        .context("Failed to load vector index")?;

    let embeddings = Arc::new(OpenAiEmbeddings::new(config.openai_api_key.clone()));
    let chat: Arc<dyn ChatProvider> = Arc::new(OpenAiChat::new(
        config.openai_api_key.clone(),
        config.chat_model.clone(),
    ));

    let retriever = Arc::new(Retriever::new(embeddings, Arc::new(index)));
    let search = Arc::new(SearchService::new(config.search.clone()));

    if config.search.mode == SearchMode::Auto && !search.is_available() {
        warn!("No web search provider configured; answers will use the knowledge base only");
    } else {
        info!("Search providers: {:?}", search.available_providers());
    }

    let ctx = Arc::new(SessionContext {
        store: Arc::new(ConversationStore::new(config.store.clone())),
        retriever,
        classifier: SearchClassifier::new(chat.clone()),
        search,
        chat,
        settings: SessionSettings {
            retrieve_top_k: config.retrieve_top_k,
            ..SessionSettings::default()
        },
    });

    start_server(ctx, config.api_port).await
}
