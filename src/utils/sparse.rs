use num::Num;
use serde::{Deserialize, Serialize};

/// Sparse vector with zero elements elided.
///
/// Holds parallel index/value arrays (SoA) plus the logical
/// dimensionality. Invariants:
/// - `inds` is strictly ascending
/// - every stored value is non-zero
/// - every stored index is `< dim`
///
/// Reading an index with no stored value yields zero. Dot products
/// walk only the shared non-zero indices of both operands, so the
/// cost is O(nnz_a + nnz_b) regardless of `dim`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVec<N>
where
    N: Num + Copy,
{
    inds: Vec<u32>,
    vals: Vec<N>,
    dim: usize,
}

impl<N> SparseVec<N>
where
    N: Num + Copy,
{
    /// An all-zero vector of the given dimensionality.
    pub fn new(dim: usize) -> Self {
        SparseVec {
            inds: Vec::new(),
            vals: Vec::new(),
            dim,
        }
    }

    /// Build from unordered (index, value) pairs.
    ///
    /// Pairs are sorted by index; zero values are dropped. Indices must
    /// be unique and `< dim`.
    pub fn from_pairs(dim: usize, mut pairs: Vec<(u32, N)>) -> Self {
        pairs.retain(|(_, v)| *v != N::zero());
        pairs.sort_unstable_by_key(|(i, _)| *i);
        debug_assert!(
            pairs.windows(2).all(|w| w[0].0 < w[1].0),
            "duplicate index in sparse pairs"
        );
        debug_assert!(pairs.last().map_or(true, |(i, _)| (*i as usize) < dim));
        let mut inds = Vec::with_capacity(pairs.len());
        let mut vals = Vec::with_capacity(pairs.len());
        for (i, v) in pairs {
            inds.push(i);
            vals.push(v);
        }
        SparseVec { inds, vals, dim }
    }

    /// Logical dimensionality (stored + elided zeros).
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored (non-zero) elements.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.inds.len()
    }

    /// Element at logical index, `None` past the dimensionality.
    pub fn get(&self, index: usize) -> Option<N> {
        if index >= self.dim {
            return None;
        }
        match self.inds.binary_search(&(index as u32)) {
            Ok(pos) => Some(self.vals[pos]),
            Err(_) => Some(N::zero()),
        }
    }

    /// Iterate stored (index, value) pairs in ascending index order.
    pub fn raw_iter(&self) -> impl Iterator<Item = (u32, N)> + '_ {
        self.inds.iter().copied().zip(self.vals.iter().copied())
    }
}

impl<N> SparseVec<N>
where
    N: Num + Copy + Into<f64>,
{
    /// Dot product, accumulated in f64.
    ///
    /// Two-pointer merge over the sorted index arrays; only indices
    /// present in both vectors contribute.
    pub fn dot(&self, other: &SparseVec<N>) -> f64 {
        let mut sum = 0.0f64;
        let mut a = 0;
        let mut b = 0;
        while a < self.inds.len() && b < other.inds.len() {
            match self.inds[a].cmp(&other.inds[b]) {
                std::cmp::Ordering::Less => a += 1,
                std::cmp::Ordering::Greater => b += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.vals[a].into() * other.vals[b].into();
                    a += 1;
                    b += 1;
                }
            }
        }
        sum
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.vals
            .iter()
            .map(|v| {
                let f: f64 = (*v).into();
                f * f
            })
            .sum::<f64>()
            .sqrt()
    }

    /// Cosine similarity, 0.0 when either operand has zero norm.
    pub fn cosine(&self, other: &SparseVec<N>) -> f64 {
        let denom = self.norm() * other.norm();
        if denom == 0.0 {
            return 0.0;
        }
        self.dot(other) / denom
    }
}

impl SparseVec<f32> {
    /// Scale to unit Euclidean norm. A zero vector stays zero.
    pub fn l2_normalize(&mut self) {
        let norm = self.norm();
        if norm == 0.0 {
            return;
        }
        let inv = (1.0 / norm) as f32;
        for v in self.vals.iter_mut() {
            *v *= inv;
        }
    }
}

impl SparseVec<f64> {
    /// Scale to unit Euclidean norm. A zero vector stays zero.
    pub fn l2_normalize(&mut self) {
        let norm = self.norm();
        if norm == 0.0 {
            return;
        }
        let inv = 1.0 / norm;
        for v in self.vals.iter_mut() {
            *v *= inv;
        }
    }
}
