// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vector index for the knowledge base
//!
//! Exact k-nearest-neighbor search over the embedded knowledge items.
//! The index is built once offline by the `build-index` binary and loaded
//! read-only at startup, kept in lockstep with the knowledge JSON file.

pub mod index;
pub mod knowledge;
pub mod loader;

pub use index::{IndexError, VectorIndex};
pub use knowledge::{KnowledgeItem, KnowledgeSource};
pub use loader::{load_index, save_index};
