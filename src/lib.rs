/// This crate is a book recommendation engine built on a TF-IDF
/// vector space with cosine similarity.
pub mod corpus;
pub mod engine;
pub mod error;
pub mod index;
pub mod snapshot;
pub mod utils;
pub mod vectorizer;

/// Immutable catalog store.
/// Owns the book records for one build cycle and derives the combined
/// per-item document text fed to the vectorizer. Lookup is by exact
/// title (titles are not unique; every match is reported) and the full
/// sorted title set is available for presentation-layer enumeration.
/// Re-ingestion replaces the corpus wholesale; everything derived from
/// it must then be rebuilt.
pub use corpus::{BookRecord, Corpus};

/// Fitted TF-IDF model.
/// Tokenizes the combined documents, removes English stop-words,
/// selects a frequency-capped vocabulary and produces one L2-normalized
/// sparse vector per item, aligned with corpus order.
///
/// # Serialization
/// Supported; persisted as part of a `Snapshot`.
pub use vectorizer::{TfIdfVectorizer, Vocabulary, DEFAULT_MAX_FEATURES};

/// Materialized pairwise cosine similarity over the fitted vectors.
/// Symmetric, unit diagonal for non-zero vectors, immutable once built
/// and safe for concurrent readers.
pub use index::SimilarityMatrix;

/// The query surface: builds corpus → vectors → matrix as one
/// cancellable unit and answers top-N similarity queries by title or
/// by index. "Title not found" is a normal `None` outcome, never an
/// error.
pub use engine::{Recommendation, Recommender, RecommenderConfig, DEFAULT_TOP_N};

/// Serializable twin of a finished build, keyed by a corpus content
/// fingerprint so a stale model is rejected instead of served.
pub use snapshot::Snapshot;

/// Error taxonomy of the build pipeline; query misses are not errors.
pub use error::{RecommendError, Result};
