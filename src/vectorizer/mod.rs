pub mod stopwords;
pub mod token;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{RecommendError, Result};
use crate::utils::sparse::SparseVec;

use self::token::{tokenize, TermFrequency};

/// Vocabulary cap used when the caller does not pick one.
pub const DEFAULT_MAX_FEATURES: usize = 5000;

/// The retained term set, term → dimension index.
///
/// Dimensions are assigned in lexicographic term order, so two builds
/// over the same corpus agree on every index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    #[serde(with = "indexmap::map::serde_seq")]
    dims: IndexMap<String, u32>,
}

impl Vocabulary {
    fn from_lexicographic_terms(terms: impl Iterator<Item = String>) -> Self {
        let mut dims = IndexMap::new();
        for (dim, term) in terms.enumerate() {
            dims.insert(term, dim as u32);
        }
        Vocabulary { dims }
    }

    /// Number of dimensions.
    pub fn len(&self) -> usize {
        self.dims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    /// Dimension of a term, if retained.
    pub fn dim_of(&self, term: &str) -> Option<u32> {
        self.dims.get(term).copied()
    }

    /// Term sitting at a dimension.
    pub fn term_at(&self, dim: usize) -> Option<&str> {
        self.dims.get_index(dim).map(|(t, _)| t.as_str())
    }

    /// Iterate terms in dimension order.
    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ {
        self.dims.keys().map(String::as_str)
    }
}

/// Fitted TF-IDF model: vocabulary, per-dimension IDF, and one
/// L2-normalized sparse vector per input document (same ordinal
/// position). Immutable once fitted; a corpus change means a refit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    vocab: Vocabulary,
    idf: Vec<f32>,
    doc_count: usize,
    vectors: Vec<SparseVec<f32>>,
}

impl TfIdfVectorizer {
    /// Fit over an ordered document sequence.
    ///
    /// 1. tokenize (lowercase, stop-words removed)
    /// 2. document frequency per term
    /// 3. vocabulary = top `max_features` terms by total corpus
    ///    frequency, ties by lexicographic order
    /// 4. weight = tf x idf, idf(t) = ln((1 + N) / (1 + DF(t))) + 1
    /// 5. L2-normalize (a zero vector stays zero)
    pub fn fit(documents: &[String], max_features: usize) -> Result<Self> {
        Self::fit_with_cancel(documents, max_features, None)
    }

    /// Same as [`fit`](Self::fit), checking `cancel` between stages.
    /// On cancellation all partial state is dropped and
    /// `RecommendError::Cancelled` comes back.
    pub fn fit_with_cancel(
        documents: &[String],
        max_features: usize,
        cancel: Option<&AtomicBool>,
    ) -> Result<Self> {
        let cancelled = || cancel.is_some_and(|c| c.load(Ordering::Relaxed));

        let tokenized: Vec<Vec<String>> = documents.par_iter().map(|d| tokenize(d)).collect();
        if cancelled() {
            return Err(RecommendError::Cancelled);
        }

        // (total occurrences, document frequency) per term. BTreeMap so
        // the selection below never depends on hash iteration order.
        let mut stats: BTreeMap<&str, (u64, u32)> = BTreeMap::new();
        for tokens in &tokenized {
            for term in tokens {
                stats.entry(term.as_str()).or_default().0 += 1;
            }
            let unique: BTreeSet<&str> = tokens.iter().map(String::as_str).collect();
            for term in unique {
                stats.entry(term).or_default().1 += 1;
            }
        }
        if stats.is_empty() {
            return Err(RecommendError::EmptyVocabulary);
        }
        if cancelled() {
            return Err(RecommendError::Cancelled);
        }

        let mut ranked: Vec<(&str, u64, u32)> = stats
            .iter()
            .map(|(term, (total, df))| (*term, *total, *df))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(max_features);
        ranked.sort_by(|a, b| a.0.cmp(b.0));

        let n = documents.len();
        let vocab =
            Vocabulary::from_lexicographic_terms(ranked.iter().map(|(t, _, _)| (*t).to_string()));
        let idf: Vec<f32> = ranked
            .iter()
            .map(|(_, _, df)| (((1 + n) as f64 / (1 + *df as usize) as f64).ln() + 1.0) as f32)
            .collect();

        let vectors: Vec<SparseVec<f32>> = tokenized
            .par_iter()
            .map(|tokens| {
                if cancelled() {
                    // placeholder; the whole result is discarded below
                    return SparseVec::new(vocab.len());
                }
                Self::weigh(tokens, &vocab, &idf)
            })
            .collect();
        if cancelled() {
            return Err(RecommendError::Cancelled);
        }

        Ok(TfIdfVectorizer {
            vocab,
            idf,
            doc_count: n,
            vectors,
        })
    }

    fn weigh(tokens: &[String], vocab: &Vocabulary, idf: &[f32]) -> SparseVec<f32> {
        let total = tokens.len();
        if total == 0 {
            return SparseVec::new(vocab.len());
        }
        let mut freq = TermFrequency::new();
        freq.add_terms(tokens);
        let mut pairs = Vec::with_capacity(freq.unique_len());
        for (term, count) in freq.iter() {
            if let Some(dim) = vocab.dim_of(term) {
                let tf = count as f32 / total as f32;
                pairs.push((dim, tf * idf[dim as usize]));
            }
        }
        let mut vec = SparseVec::from_pairs(vocab.len(), pairs);
        vec.l2_normalize();
        vec
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Per-dimension IDF weights.
    pub fn idf(&self) -> &[f32] {
        &self.idf
    }

    /// Documents seen at fit time.
    pub fn doc_count(&self) -> usize {
        self.doc_count
    }

    /// One normalized vector per document, in document order.
    pub fn vectors(&self) -> &[SparseVec<f32>] {
        &self.vectors
    }
}
