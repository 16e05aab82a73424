// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Offline knowledge base index builder
//!
//! Reads the source document text files and the FAQ JSON, embeds every item,
//! and writes the knowledge JSON + binary index pair consumed by the serving
//! node. Run whenever the knowledge base changes:
//!
//! ```text
//! OPENAI_API_KEY=... DOC_PATHS=jetbay_doc.txt,jetbay_workflow.txt \
//!     FAQ_PATH=jetbay-intro.json cargo run --bin build-index
//! ```

use anyhow::{bail, Context, Result};
use jetbay_rag_node::{
    embeddings::EmbeddingProvider,
    vector::{save_index, KnowledgeItem, KnowledgeSource, VectorIndex},
    OpenAiEmbeddings,
};
use serde::Deserialize;
use std::{env, fs};
use tracing::info;

#[derive(Debug, Deserialize)]
struct FaqEntry {
    question: String,
    answer: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let api_key = env::var("OPENAI_API_KEY").context("OPENAI_API_KEY is required")?;

    let knowledge_path =
        env::var("KNOWLEDGE_BASE_PATH").unwrap_or_else(|_| "knowledge_base_data.json".to_string());
    let index_path = env::var("VECTOR_INDEX_PATH").unwrap_or_else(|_| "jetbay.index".to_string());

    let mut items = Vec::new();

    // Each document file becomes one knowledge item, matching how the
    // serving prompt consumes whole passages.
    if let Ok(doc_paths) = env::var("DOC_PATHS") {
        for path in doc_paths.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read document {}", path))?;
            let text = text.trim();
            if text.is_empty() {
                bail!("Document {} is empty", path);
            }
            items.push(KnowledgeItem::new(text, KnowledgeSource::Doc));
            info!("Loaded document: {}", path);
        }
    }

    if let Ok(faq_path) = env::var("FAQ_PATH") {
        let raw = fs::read_to_string(&faq_path)
            .with_context(|| format!("Failed to read FAQ file {}", faq_path))?;
        let entries: Vec<FaqEntry> =
            serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", faq_path))?;
        info!("Loaded {} FAQ entries from {}", entries.len(), faq_path);

        for entry in entries {
            items.push(KnowledgeItem::new(
                format!("{} {}", entry.question, entry.answer),
                KnowledgeSource::Faq,
            ));
        }
    }

    if items.is_empty() {
        bail!("No knowledge items found; set DOC_PATHS and/or FAQ_PATH");
    }

    let embeddings = OpenAiEmbeddings::new(api_key);
    let mut index = VectorIndex::new(embeddings.dimension());

    let total = items.len();
    for (i, item) in items.into_iter().enumerate() {
        info!("Embedding item {}/{}", i + 1, total);
        let vector = embeddings
            .embed(&item.text)
            .await
            .with_context(|| format!("Embedding failed for item {}", i + 1))?;
        index.insert(vector, item)?;
    }

    save_index(index, &index_path, &knowledge_path)?;
    info!(
        "Index written: {} ({} items), knowledge: {}",
        index_path, total, knowledge_path
    );

    Ok(())
}
