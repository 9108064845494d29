use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::corpus::Corpus;
use crate::engine::Recommender;
use crate::error::{RecommendError, Result};
use crate::index::SimilarityMatrix;
use crate::vectorizer::TfIdfVectorizer;

/// Serializable twin of a finished build, for fast restarts.
///
/// Holds the derived state (fitted vectorizer + matrix) but not the
/// corpus itself; the corpus is reattached on load and verified
/// against the stored content fingerprint, so a snapshot can never be
/// served over a catalog it was not built from.
#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    fingerprint: u64,
    vectorizer: TfIdfVectorizer,
    matrix: SimilarityMatrix,
}

impl Snapshot {
    /// Capture the derived state of a finished build.
    pub fn capture(recommender: &Recommender) -> Self {
        Snapshot {
            fingerprint: recommender.corpus().fingerprint(),
            vectorizer: recommender.vectorizer().clone(),
            matrix: recommender.matrix().clone(),
        }
    }

    /// Fingerprint of the corpus this snapshot was built from.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Write as CBOR.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| RecommendError::Snapshot {
            message: format!("create {}: {e}", path.display()),
        })?;
        serde_cbor::to_writer(file, self).map_err(|e| RecommendError::Snapshot {
            message: format!("encode {}: {e}", path.display()),
        })
    }

    /// Read back a previously saved snapshot.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| RecommendError::Snapshot {
            message: format!("open {}: {e}", path.display()),
        })?;
        serde_cbor::from_reader(file).map_err(|e| RecommendError::Snapshot {
            message: format!("decode {}: {e}", path.display()),
        })
    }

    /// Reattach to a corpus. `None` means the corpus has changed since
    /// the snapshot was captured (stale); the caller rebuilds.
    pub fn into_recommender(self, corpus: Corpus) -> Option<Recommender> {
        if corpus.fingerprint() != self.fingerprint {
            return None;
        }
        Some(Recommender::from_parts(corpus, self.vectorizer, self.matrix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::BookRecord;
    use crate::engine::RecommenderConfig;

    fn record(title: &str, content: &str) -> BookRecord {
        BookRecord {
            title: title.to_string(),
            authors: String::new(),
            content: content.to_string(),
            average_rating: None,
            isbn: None,
        }
    }

    fn sample_corpus() -> Corpus {
        Corpus::from_records(vec![
            record("A", "cats and dogs"),
            record("B", "dogs and cats"),
            record("C", "space travel"),
        ])
        .expect("corpus")
    }

    #[test]
    fn round_trip_restores_identical_recommendations() {
        let built =
            Recommender::build(sample_corpus(), &RecommenderConfig::default()).expect("build");
        let expected = built.recommend("A", 2).expect("title exists");

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("model.cbor");
        Snapshot::capture(&built).save(&path).expect("save");

        let restored = Snapshot::load(&path)
            .expect("load")
            .into_recommender(sample_corpus())
            .expect("fingerprint matches");
        assert_eq!(restored.recommend("A", 2).expect("title exists"), expected);
    }

    #[test]
    fn stale_snapshot_is_rejected() {
        let built =
            Recommender::build(sample_corpus(), &RecommenderConfig::default()).expect("build");
        let snapshot = Snapshot::capture(&built);

        let changed = Corpus::from_records(vec![
            record("A", "cats and dogs"),
            record("B", "dogs and cats"),
            record("C", "space travel"),
            record("D", "a fourth book"),
        ])
        .expect("corpus");
        assert!(snapshot.into_recommender(changed).is_none());
    }

    #[test]
    fn missing_snapshot_file_is_a_snapshot_error() {
        let err = Snapshot::load("/definitely/not/here.cbor").unwrap_err();
        assert!(matches!(err, RecommendError::Snapshot { .. }));
    }
}
