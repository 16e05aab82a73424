// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Exact L2 nearest-neighbor index
//!
//! A flat index: every query scans all entries and ranks them by Euclidean
//! distance. The knowledge base is small (a handful of documents plus FAQ
//! pairs), so exact search is both simpler and more accurate than an
//! approximate structure. Thread-safe for concurrent reads; the serving
//! path never mutates it.

use thiserror::Error;

use super::knowledge::KnowledgeItem;

/// Errors from index construction and queries
#[derive(Debug, Error)]
pub enum IndexError {
    /// Vector has the wrong dimension for this index
    #[error("Dimension mismatch: index is {expected}D, vector is {actual}D")]
    DimensionMismatch {
        /// Index dimension
        expected: usize,
        /// Offending vector dimension
        actual: usize,
    },

    /// Vector contains NaN or infinite components
    #[error("Vector at position {position} contains non-finite values")]
    NonFinite {
        /// Insertion position of the offending vector
        position: usize,
    },

    /// Index file and knowledge file disagree on entry count
    #[error("Index/knowledge count mismatch: {vectors} vectors, {items} items")]
    CountMismatch {
        /// Vector count in the index file
        vectors: usize,
        /// Item count in the knowledge file
        items: usize,
    },

    /// Failed to read or parse an index or knowledge file
    #[error("Failed to load {path}: {reason}")]
    LoadFailed {
        /// File path
        path: String,
        /// Failure description
        reason: String,
    },
}

/// Flat exact-search vector index over knowledge items.
///
/// Invariants: entry count equals knowledge item count, and every vector has
/// the same dimension, fixed at construction.
#[derive(Debug)]
pub struct VectorIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
    items: Vec<KnowledgeItem>,
}

impl VectorIndex {
    /// Create an empty index for vectors of the given dimension
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Number of indexed entries
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Vector dimension fixed at construction
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Append one entry, validating dimension and finiteness
    pub fn insert(&mut self, vector: Vec<f32>, item: KnowledgeItem) -> Result<(), IndexError> {
        if vector.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(IndexError::NonFinite {
                position: self.vectors.len(),
            });
        }

        self.vectors.push(vector);
        self.items.push(item);
        Ok(())
    }

    /// Find the `top_k` nearest entries to `query` by Euclidean distance.
    ///
    /// Results are ordered by non-decreasing distance. If `top_k` exceeds the
    /// index size, all entries are returned; the call never fails for an
    /// oversized `top_k`.
    pub fn search(
        &self,
        query: &[f32],
        top_k: usize,
    ) -> Result<Vec<(f32, &KnowledgeItem)>, IndexError> {
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut ranked: Vec<(f32, usize)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (l2_distance(query, v), i))
            .collect();

        // Distances are finite (enforced at insert), so total_cmp is safe
        // and the ordering is deterministic for repeated queries.
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        ranked.truncate(top_k.min(self.items.len()));

        Ok(ranked
            .into_iter()
            .map(|(dist, i)| (dist, &self.items[i]))
            .collect())
    }

    /// Consume the index into its raw parts (used by the file writer)
    pub fn into_parts(self) -> (usize, Vec<Vec<f32>>, Vec<KnowledgeItem>) {
        (self.dimension, self.vectors, self.items)
    }

    /// Rebuild an index from raw parts, re-validating invariants
    pub fn from_parts(
        dimension: usize,
        vectors: Vec<Vec<f32>>,
        items: Vec<KnowledgeItem>,
    ) -> Result<Self, IndexError> {
        if vectors.len() != items.len() {
            return Err(IndexError::CountMismatch {
                vectors: vectors.len(),
                items: items.len(),
            });
        }

        let mut index = Self::new(dimension);
        for (vector, item) in vectors.into_iter().zip(items) {
            index.insert(vector, item)?;
        }
        Ok(index)
    }
}

fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::knowledge::KnowledgeSource;

    fn item(text: &str) -> KnowledgeItem {
        KnowledgeItem::new(text, KnowledgeSource::Other)
    }

    fn sample_index() -> VectorIndex {
        let mut index = VectorIndex::new(2);
        index.insert(vec![0.0, 0.0], item("origin")).unwrap();
        index.insert(vec![1.0, 0.0], item("right")).unwrap();
        index.insert(vec![0.0, 3.0], item("up")).unwrap();
        index
    }

    #[test]
    fn test_search_orders_by_distance() {
        let index = sample_index();
        let results = index.search(&[0.1, 0.0], 3).unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].1.text, "origin");
        assert_eq!(results[1].1.text, "right");
        assert_eq!(results[2].1.text, "up");
        assert!(results[0].0 <= results[1].0);
        assert!(results[1].0 <= results[2].0);
    }

    #[test]
    fn test_search_clamps_oversized_top_k() {
        let index = sample_index();
        let results = index.search(&[0.0, 0.0], 100).unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_search_exact_top_k() {
        let index = sample_index();
        let results = index.search(&[0.0, 0.0], 2).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_search_is_idempotent() {
        let index = sample_index();
        let first: Vec<String> = index
            .search(&[0.5, 0.5], 3)
            .unwrap()
            .iter()
            .map(|(_, i)| i.text.clone())
            .collect();
        let second: Vec<String> = index
            .search(&[0.5, 0.5], 3)
            .unwrap()
            .iter()
            .map(|(_, i)| i.text.clone())
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_search_empty_index() {
        let index = VectorIndex::new(4);
        let results = index.search(&[0.0; 4], 3).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_insert_rejects_wrong_dimension() {
        let mut index = VectorIndex::new(3);
        let err = index.insert(vec![1.0, 2.0], item("short")).unwrap_err();
        assert!(matches!(
            err,
            IndexError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_insert_rejects_non_finite() {
        let mut index = VectorIndex::new(2);
        let err = index.insert(vec![f32::NAN, 0.0], item("nan")).unwrap_err();
        assert!(matches!(err, IndexError::NonFinite { position: 0 }));
    }

    #[test]
    fn test_search_rejects_wrong_query_dimension() {
        let index = sample_index();
        assert!(index.search(&[0.0; 5], 1).is_err());
    }

    #[test]
    fn test_from_parts_validates_counts() {
        let err = VectorIndex::from_parts(2, vec![vec![0.0, 0.0]], vec![]).unwrap_err();
        assert!(matches!(
            err,
            IndexError::CountMismatch {
                vectors: 1,
                items: 0
            }
        ));
    }
}
