use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RecommendError, Result};

/// One catalog entry.
///
/// Textual fields are normalized to `""` when the source has no value;
/// `average_rating` and `isbn` keep their absence (`None`) instead of
/// being substituted. Titles are NOT unique across the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    pub authors: String,
    pub content: String,
    pub average_rating: Option<f64>,
    pub isbn: Option<String>,
}

/// Immutable catalog store.
///
/// Owns the records for one build cycle. There are no mutation
/// operations: re-ingestion replaces the whole corpus, and everything
/// derived from it (vocabulary, vectors, matrix) must be rebuilt
/// together.
#[derive(Debug, Clone)]
pub struct Corpus {
    records: Vec<BookRecord>,
}

impl Corpus {
    /// Wrap an already-ingested record set.
    pub fn from_records(records: Vec<BookRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(RecommendError::DataLoad {
                path: "<records>".to_string(),
                message: "catalog is empty".to_string(),
            });
        }
        Ok(Corpus { records })
    }

    /// Load a catalog from a CSV file.
    ///
    /// Required columns: `title`, `authors`. Optional: `content`,
    /// `average_rating`, `isbn`. Missing textual cells become `""`;
    /// an absent or unparsable rating and an absent isbn stay `None`.
    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data_load = |message: String| RecommendError::DataLoad {
            path: path.display().to_string(),
            message,
        };

        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| data_load(format!("failed to open CSV: {e}")))?;

        let headers = reader
            .headers()
            .map_err(|e| data_load(format!("failed to read headers: {e}")))?
            .clone();
        let col = |name: &str| headers.iter().position(|h| h == name);

        let title_col = col("title")
            .ok_or_else(|| data_load("missing required column 'title'".to_string()))?;
        let authors_col = col("authors")
            .ok_or_else(|| data_load("missing required column 'authors'".to_string()))?;
        let content_col = col("content");
        let rating_col = col("average_rating");
        let isbn_col = col("isbn");

        let mut records = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let record =
                result.map_err(|e| data_load(format!("failed to read row {}: {e}", row + 2)))?;
            let text = |idx: usize| record.get(idx).unwrap_or("").to_string();
            let rating = rating_col
                .and_then(|idx| record.get(idx))
                .and_then(|v| v.trim().parse::<f64>().ok());
            let isbn = isbn_col
                .and_then(|idx| record.get(idx))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string);
            records.push(BookRecord {
                title: text(title_col),
                authors: text(authors_col),
                content: content_col.map(text).unwrap_or_default(),
                average_rating: rating,
                isbn,
            });
        }
        if records.is_empty() {
            return Err(data_load("no data rows".to_string()));
        }
        Ok(Corpus { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BookRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[BookRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &BookRecord> + '_ {
        self.records.iter()
    }

    /// Every index whose title matches exactly, in corpus order.
    /// Callers must handle zero and multiple matches.
    pub fn find_by_title(&self, title: &str) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.title == title)
            .map(|(i, _)| i)
            .collect()
    }

    /// First corpus-order index whose title matches exactly.
    pub fn first_by_title(&self, title: &str) -> Option<usize> {
        self.records.iter().position(|r| r.title == title)
    }

    /// Sorted, de-duplicated titles for presentation-layer enumeration.
    pub fn all_titles(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self.records.iter().map(|r| r.title.as_str()).collect();
        set.into_iter().collect()
    }

    /// The combined text for one record: `title authors content`,
    /// single-space joined. This is the unit fed to the vectorizer.
    pub fn document(&self, index: usize) -> Option<String> {
        self.records
            .get(index)
            .map(|r| format!("{} {} {}", r.title, r.authors, r.content))
    }

    /// Combined texts for all records, in corpus order.
    pub fn documents(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| format!("{} {} {}", r.title, r.authors, r.content))
            .collect()
    }

    /// Content hash of the whole catalog. Snapshots store it; a
    /// mismatch on load marks the snapshot stale.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.records.len().hash(&mut hasher);
        for r in &self.records {
            r.title.hash(&mut hasher);
            r.authors.hash(&mut hasher);
            r.content.hash(&mut hasher);
            r.average_rating.map(f64::to_bits).hash(&mut hasher);
            r.isbn.hash(&mut hasher);
        }
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn record(title: &str, authors: &str, content: &str) -> BookRecord {
        BookRecord {
            title: title.to_string(),
            authors: authors.to_string(),
            content: content.to_string(),
            average_rating: None,
            isbn: None,
        }
    }

    #[test]
    fn empty_record_set_is_a_load_error() {
        let err = Corpus::from_records(Vec::new()).unwrap_err();
        assert!(matches!(err, RecommendError::DataLoad { .. }));
    }

    #[test]
    fn load_csv_with_all_columns() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "title,authors,content,average_rating,isbn").unwrap();
        writeln!(file, "Dune,Frank Herbert,desert planet epic,4.25,0441172717").unwrap();
        writeln!(file, "Emma,Jane Austen,,,").unwrap();

        let corpus = Corpus::load_csv(file.path()).expect("load");
        assert_eq!(corpus.len(), 2);
        let dune = corpus.get(0).unwrap();
        assert_eq!(dune.average_rating, Some(4.25));
        assert_eq!(dune.isbn.as_deref(), Some("0441172717"));
        let emma = corpus.get(1).unwrap();
        assert_eq!(emma.content, "");
        assert_eq!(emma.average_rating, None);
        assert_eq!(emma.isbn, None);
    }

    #[test]
    fn load_csv_without_optional_columns() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "title,authors").unwrap();
        writeln!(file, "Dune,Frank Herbert").unwrap();

        let corpus = Corpus::load_csv(file.path()).expect("load");
        assert_eq!(corpus.get(0).unwrap().content, "");
        assert_eq!(corpus.get(0).unwrap().isbn, None);
    }

    #[test]
    fn load_csv_missing_required_column() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "title,rating").unwrap();
        writeln!(file, "Dune,4.25").unwrap();

        let err = Corpus::load_csv(file.path()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("authors"), "unexpected message: {msg}");
    }

    #[test]
    fn load_csv_missing_file() {
        let err = Corpus::load_csv("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, RecommendError::DataLoad { .. }));
    }

    #[test]
    fn load_csv_with_no_rows() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "title,authors").unwrap();

        let err = Corpus::load_csv(file.path()).unwrap_err();
        assert!(matches!(err, RecommendError::DataLoad { .. }));
    }

    #[test]
    fn duplicate_titles_all_found_in_corpus_order() {
        let corpus = Corpus::from_records(vec![
            record("X", "a", "one"),
            record("Y", "b", "two"),
            record("X", "c", "three"),
        ])
        .unwrap();
        assert_eq!(corpus.find_by_title("X"), vec![0, 2]);
        assert_eq!(corpus.first_by_title("X"), Some(0));
        assert_eq!(corpus.first_by_title("Z"), None);
    }

    #[test]
    fn titles_are_sorted_and_distinct() {
        let corpus = Corpus::from_records(vec![
            record("Zen", "a", ""),
            record("Art", "b", ""),
            record("Zen", "c", ""),
        ])
        .unwrap();
        assert_eq!(corpus.all_titles(), vec!["Art", "Zen"]);
    }

    #[test]
    fn document_joins_fields_with_single_spaces() {
        let corpus = Corpus::from_records(vec![record("Dune", "Herbert", "sand")]).unwrap();
        assert_eq!(corpus.document(0).unwrap(), "Dune Herbert sand");
        assert_eq!(corpus.document(1), None);
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = Corpus::from_records(vec![record("X", "a", "one")]).unwrap();
        let b = a.clone();
        assert_eq!(a.fingerprint(), b.fingerprint());
        let c = Corpus::from_records(vec![record("X", "a", "two")]).unwrap();
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
