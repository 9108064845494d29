use std::sync::atomic::AtomicBool;

use serde::{Deserialize, Serialize};

use crate::corpus::Corpus;
use crate::error::Result;
use crate::index::SimilarityMatrix;
use crate::vectorizer::{TfIdfVectorizer, DEFAULT_MAX_FEATURES};

/// Result count used when the caller does not pick one.
pub const DEFAULT_TOP_N: usize = 5;

/// Build-time knobs for [`Recommender::build`].
#[derive(Debug, Clone)]
pub struct RecommenderConfig {
    /// Vocabulary cap handed to the vectorizer.
    pub max_features: usize,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        RecommenderConfig {
            max_features: DEFAULT_MAX_FEATURES,
        }
    }
}

/// One recommended catalog entry.
///
/// `buy_link`/`reviews_link` are derived string templates over the
/// isbn, best-effort references only, `None` when the record has no
/// isbn. `score` is the cosine similarity against the query item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub authors: String,
    pub average_rating: Option<f64>,
    pub buy_link: Option<String>,
    pub reviews_link: Option<String>,
    pub score: f64,
}

fn buy_link(isbn: &str) -> String {
    format!("https://www.amazon.in/dp/{isbn}")
}

fn reviews_link(isbn: &str) -> String {
    format!("https://www.goodreads.com/search?q={isbn}")
}

/// The query surface over a finished build.
///
/// Owns the corpus together with everything derived from it, so a
/// value of this type is always internally consistent: build it,
/// share it (`&self` queries only), drop it to invalidate. There is
/// no ambient global model; callers pass the instance around.
#[derive(Debug, Clone)]
pub struct Recommender {
    corpus: Corpus,
    vectorizer: TfIdfVectorizer,
    matrix: SimilarityMatrix,
}

impl Recommender {
    /// Run the full pipeline: combined documents → TF-IDF vectors →
    /// similarity matrix.
    pub fn build(corpus: Corpus, config: &RecommenderConfig) -> Result<Self> {
        Self::build_inner(corpus, config, None)
    }

    /// Cancellable rebuild. Setting the flag makes the build return
    /// `RecommendError::Cancelled`; no partial index ever escapes.
    pub fn build_with_cancel(
        corpus: Corpus,
        config: &RecommenderConfig,
        cancel: &AtomicBool,
    ) -> Result<Self> {
        Self::build_inner(corpus, config, Some(cancel))
    }

    fn build_inner(
        corpus: Corpus,
        config: &RecommenderConfig,
        cancel: Option<&AtomicBool>,
    ) -> Result<Self> {
        let documents = corpus.documents();
        let vectorizer =
            TfIdfVectorizer::fit_with_cancel(&documents, config.max_features, cancel)?;
        let matrix = SimilarityMatrix::build_with_cancel(vectorizer.vectors(), cancel)?;
        Ok(Recommender {
            corpus,
            vectorizer,
            matrix,
        })
    }

    pub(crate) fn from_parts(
        corpus: Corpus,
        vectorizer: TfIdfVectorizer,
        matrix: SimilarityMatrix,
    ) -> Self {
        Recommender {
            corpus,
            vectorizer,
            matrix,
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }

    /// Top `top_n` most similar other items for a title.
    ///
    /// `None` means the title matched nothing — an expected outcome,
    /// not an error. When several items share the title, the first in
    /// corpus order is the query item; only that index is excluded
    /// from the results, so a content-identical twin can still be
    /// recommended.
    pub fn recommend(&self, title: &str, top_n: usize) -> Option<Vec<Recommendation>> {
        let index = self.corpus.first_by_title(title)?;
        self.recommend_by_index(index, top_n)
    }

    /// Identifier-based variant for callers that resolved the item
    /// themselves (e.g. to disambiguate duplicate titles). `None` only
    /// when the index is out of range.
    pub fn recommend_by_index(&self, index: usize, top_n: usize) -> Option<Vec<Recommendation>> {
        if index >= self.corpus.len() {
            return None;
        }
        let row = self.matrix.row(index);
        let mut ranked: Vec<(usize, f32)> = row
            .iter()
            .copied()
            .enumerate()
            .filter(|(j, _)| *j != index)
            .collect();
        // score descending, corpus index ascending on ties
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Some(
            ranked
                .into_iter()
                .take(top_n)
                .map(|(j, score)| self.recommendation(j, score))
                .collect(),
        )
    }

    fn recommendation(&self, index: usize, score: f32) -> Recommendation {
        let record = &self.corpus.records()[index];
        Recommendation {
            title: record.title.clone(),
            authors: record.authors.clone(),
            average_rating: record.average_rating,
            buy_link: record.isbn.as_deref().map(buy_link),
            reviews_link: record.isbn.as_deref().map(reviews_link),
            score: score as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::BookRecord;

    fn record(title: &str, authors: &str, content: &str) -> BookRecord {
        BookRecord {
            title: title.to_string(),
            authors: authors.to_string(),
            content: content.to_string(),
            average_rating: None,
            isbn: None,
        }
    }

    fn build(records: Vec<BookRecord>) -> Recommender {
        let corpus = Corpus::from_records(records).expect("corpus");
        Recommender::build(corpus, &RecommenderConfig::default()).expect("build")
    }

    #[test]
    fn overlapping_vocabulary_ranks_first() {
        let rec = build(vec![
            record("A", "x", "cats and dogs"),
            record("B", "y", "dogs and cats"),
            record("C", "z", "space travel"),
        ]);
        let results = rec.recommend("A", 2).expect("title exists");
        let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "C"]);
        assert!(results[0].score > results[1].score);
    }

    #[test]
    fn unknown_title_is_not_found() {
        let rec = build(vec![
            record("A", "x", "cats"),
            record("B", "y", "dogs"),
        ]);
        assert!(rec.recommend("Unknown Title", 5).is_none());
    }

    #[test]
    fn query_item_is_never_recommended() {
        let rec = build(vec![
            record("A", "x", "cats dogs"),
            record("B", "y", "cats dogs"),
            record("C", "z", "cats dogs"),
        ]);
        let results = rec.recommend("A", 10).expect("title exists");
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.title != "A"));
    }

    #[test]
    fn at_most_top_n_results() {
        let rec = build(vec![
            record("A", "x", "cats"),
            record("B", "y", "cats"),
            record("C", "z", "cats"),
            record("D", "w", "cats"),
        ]);
        assert_eq!(rec.recommend("A", 2).unwrap().len(), 2);
        // corpus smaller than top_n + 1: everything eligible comes back
        assert_eq!(rec.recommend("A", 10).unwrap().len(), 3);
    }

    #[test]
    fn ties_break_by_ascending_corpus_index() {
        // B and C are identical, so both score identically against A
        let rec = build(vec![
            record("A", "x", "cats dogs"),
            record("B", "y", "cats dogs birds"),
            record("C", "z", "cats dogs birds"),
        ]);
        let results = rec.recommend("A", 3).expect("title exists");
        let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "C"]);
    }

    #[test]
    fn duplicate_titles_query_first_match_and_may_recommend_the_twin() {
        let rec = build(vec![
            record("X", "a", "cats and dogs"),
            record("Y", "b", "space travel"),
            record("X", "c", "dogs and cats"),
        ]);
        let results = rec.recommend("X", 3).expect("title exists");
        // the twin at index 2 shares vocabulary and is recommended first
        assert_eq!(results[0].title, "X");
        assert_eq!(results[0].authors, "c");
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn links_derive_from_isbn_or_stay_absent() {
        let mut with_isbn = record("B", "y", "cats");
        with_isbn.isbn = Some("0441172717".to_string());
        with_isbn.average_rating = Some(4.25);
        let rec = build(vec![record("A", "x", "cats"), with_isbn]);
        let results = rec.recommend("A", 1).expect("title exists");
        assert_eq!(
            results[0].buy_link.as_deref(),
            Some("https://www.amazon.in/dp/0441172717")
        );
        assert_eq!(
            results[0].reviews_link.as_deref(),
            Some("https://www.goodreads.com/search?q=0441172717")
        );
        assert_eq!(results[0].average_rating, Some(4.25));

        let rec = build(vec![record("A", "x", "cats"), record("B", "y", "cats")]);
        let results = rec.recommend("A", 1).expect("title exists");
        assert_eq!(results[0].buy_link, None);
        assert_eq!(results[0].reviews_link, None);
    }

    #[test]
    fn empty_document_item_queries_without_error() {
        let rec = build(vec![
            record("Dune", "", ""),
            record("B", "y", "desert dune planet"),
        ]);
        // "Dune" tokenizes to one term; its vector may or may not hit
        // the vocabulary, but the query must stay a normal outcome
        let results = rec.recommend("Dune", 5).expect("title exists");
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn out_of_range_index_is_none() {
        let rec = build(vec![record("A", "x", "cats"), record("B", "y", "dogs")]);
        assert!(rec.recommend_by_index(2, 5).is_none());
        assert!(rec.recommend_by_index(0, 5).is_some());
    }

    #[test]
    fn cancelled_build_discards_everything() {
        use std::sync::atomic::AtomicBool;
        let corpus = Corpus::from_records(vec![record("A", "x", "cats")]).expect("corpus");
        let cancel = AtomicBool::new(true);
        let err =
            Recommender::build_with_cancel(corpus, &RecommenderConfig::default(), &cancel)
                .unwrap_err();
        assert!(matches!(err, crate::error::RecommendError::Cancelled));
    }
}
