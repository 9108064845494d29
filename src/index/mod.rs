use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{RecommendError, Result};
use crate::utils::sparse::SparseVec;

/// Materialized pairwise cosine similarity, row-major `n x n`.
///
/// Built once from the fitted vectors, read-only afterward; safe to
/// share across threads for concurrent queries. Invariants:
/// - `get(i, j) == get(j, i)` (each dot walks shared indices in the
///   same ascending order from either side, so the sums are identical)
/// - `get(i, i) == 1.0` for a non-zero vector, `0.0` for a zero one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    n: usize,
    data: Vec<f32>,
}

impl SimilarityMatrix {
    /// Compute the full matrix. Rows are built in parallel; input
    /// vectors must already be L2-normalized (cosine == dot).
    pub fn build(vectors: &[SparseVec<f32>]) -> Self {
        // no flag, so the only error path cannot trigger
        Self::build_with_cancel(vectors, None).expect("uncancellable build")
    }

    /// Same as [`build`](Self::build), checking `cancel` while rows
    /// are produced. On cancellation the partial matrix is dropped.
    pub fn build_with_cancel(
        vectors: &[SparseVec<f32>],
        cancel: Option<&AtomicBool>,
    ) -> Result<Self> {
        let cancelled = || cancel.is_some_and(|c| c.load(Ordering::Relaxed));
        let n = vectors.len();
        let mut data = vec![0.0f32; n * n];

        data.par_chunks_mut(n.max(1)).enumerate().for_each(|(i, row)| {
            if cancelled() {
                return;
            }
            let vi = &vectors[i];
            if vi.nnz() == 0 {
                // zero vector: dissimilar to everything, itself included
                return;
            }
            for (j, slot) in row.iter_mut().enumerate() {
                *slot = if j == i {
                    1.0
                } else {
                    vectors[j].dot(vi) as f32
                };
            }
        });

        if cancelled() {
            return Err(RecommendError::Cancelled);
        }
        Ok(SimilarityMatrix { n, data })
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Similarity between two items.
    pub fn get(&self, i: usize, j: usize) -> f32 {
        assert!(i < self.n && j < self.n, "similarity index out of bounds");
        self.data[i * self.n + j]
    }

    /// All similarities for one item, indexed by the other item.
    pub fn row(&self, i: usize) -> &[f32] {
        assert!(i < self.n, "similarity index out of bounds");
        &self.data[i * self.n..(i + 1) * self.n]
    }
}
