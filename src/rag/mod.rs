// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Retrieval-augmented generation building blocks
//!
//! The retriever maps a natural-language query to the nearest knowledge-base
//! passages; the classifier decides per turn whether live web search should
//! supplement retrieval.

pub mod classifier;
pub mod retriever;

pub use classifier::{parse_decision, SearchClassifier};
pub use retriever::{RetrieveError, Retriever};
