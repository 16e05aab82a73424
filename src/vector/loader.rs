// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Index and knowledge file persistence
//!
//! Two files travel together: a JSON array of knowledge items and a bincode
//! file with the matching vectors. The loader validates that they are in
//! lockstep (same count, uniform dimension) before serving.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use super::index::{IndexError, VectorIndex};
use super::knowledge::KnowledgeItem;

/// On-disk layout of the binary index file
#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

/// Load the vector index and its knowledge file, validating lockstep.
pub fn load_index(
    index_path: impl AsRef<Path>,
    knowledge_path: impl AsRef<Path>,
) -> Result<VectorIndex, IndexError> {
    let index_path = index_path.as_ref();
    let knowledge_path = knowledge_path.as_ref();

    let raw = fs::read_to_string(knowledge_path).map_err(|e| IndexError::LoadFailed {
        path: knowledge_path.display().to_string(),
        reason: e.to_string(),
    })?;
    let items: Vec<KnowledgeItem> =
        serde_json::from_str(&raw).map_err(|e| IndexError::LoadFailed {
            path: knowledge_path.display().to_string(),
            reason: e.to_string(),
        })?;

    let raw = fs::read(index_path).map_err(|e| IndexError::LoadFailed {
        path: index_path.display().to_string(),
        reason: e.to_string(),
    })?;
    let file: IndexFile = bincode::deserialize(&raw).map_err(|e| IndexError::LoadFailed {
        path: index_path.display().to_string(),
        reason: e.to_string(),
    })?;

    let index = VectorIndex::from_parts(file.dimension, file.vectors, items)?;
    info!(
        "Loaded vector index: {} entries, {} dimensions",
        index.len(),
        index.dimension()
    );

    Ok(index)
}

/// Write the index and knowledge file pair produced by the offline builder.
pub fn save_index(
    index: VectorIndex,
    index_path: impl AsRef<Path>,
    knowledge_path: impl AsRef<Path>,
) -> Result<(), IndexError> {
    let index_path = index_path.as_ref();
    let knowledge_path = knowledge_path.as_ref();

    let (dimension, vectors, items) = index.into_parts();

    let json = serde_json::to_string_pretty(&items).map_err(|e| IndexError::LoadFailed {
        path: knowledge_path.display().to_string(),
        reason: e.to_string(),
    })?;
    fs::write(knowledge_path, json).map_err(|e| IndexError::LoadFailed {
        path: knowledge_path.display().to_string(),
        reason: e.to_string(),
    })?;

    let file = IndexFile { dimension, vectors };
    let bytes = bincode::serialize(&file).map_err(|e| IndexError::LoadFailed {
        path: index_path.display().to_string(),
        reason: e.to_string(),
    })?;
    fs::write(index_path, bytes).map_err(|e| IndexError::LoadFailed {
        path: index_path.display().to_string(),
        reason: e.to_string(),
    })?;

    Ok(())
}
