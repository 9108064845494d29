use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::stopwords::is_stop_word;

/// Split text into index terms.
///
/// Lowercases, splits on non-alphanumeric runs, keeps terms of two or
/// more characters, and drops English stop-words. The surviving term
/// count is the document length used for TF.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().nth(1).is_some())
        .filter(|t| !is_stop_word(t))
        .map(str::to_owned)
        .collect()
}

/// Term occurrence counter for one document.
///
/// Insertion-ordered so that repeated runs over the same token stream
/// observe identical iteration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TermFrequency {
    #[serde(with = "indexmap::map::serde_seq")]
    term_count: IndexMap<String, u32>,
    total: u64,
}

impl TermFrequency {
    pub fn new() -> Self {
        TermFrequency {
            term_count: IndexMap::new(),
            total: 0,
        }
    }

    /// Count one term occurrence.
    #[inline]
    pub fn add_term(&mut self, term: &str) -> &mut Self {
        *self.term_count.entry(term.to_string()).or_insert(0) += 1;
        self.total += 1;
        self
    }

    /// Count a slice of term occurrences.
    #[inline]
    pub fn add_terms<T>(&mut self, terms: &[T]) -> &mut Self
    where
        T: AsRef<str>,
    {
        for term in terms {
            self.add_term(term.as_ref());
        }
        self
    }

    /// Occurrences of one term.
    pub fn count(&self, term: &str) -> u32 {
        self.term_count.get(term).copied().unwrap_or(0)
    }

    /// Total occurrences across all terms.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct terms.
    pub fn unique_len(&self) -> usize {
        self.term_count.len()
    }

    /// Iterate (term, count) in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.term_count.iter().map(|(t, c)| (t.as_str(), *c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_lowercases_and_splits() {
        let toks = tokenize("Cats AND dogs, dogs!");
        assert_eq!(toks, vec!["cats", "dogs", "dogs"]);
    }

    #[test]
    fn tokenize_drops_single_chars_and_stop_words() {
        let toks = tokenize("A x tale of two cities");
        assert_eq!(toks, vec!["tale", "cities"]);
    }

    #[test]
    fn tokenize_empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("the a an of").is_empty());
    }

    #[test]
    fn term_frequency_counts() {
        let mut tf = TermFrequency::new();
        tf.add_terms(&["dogs", "cats", "dogs"]);
        assert_eq!(tf.count("dogs"), 2);
        assert_eq!(tf.count("cats"), 1);
        assert_eq!(tf.count("birds"), 0);
        assert_eq!(tf.total(), 3);
        assert_eq!(tf.unique_len(), 2);
    }

    #[test]
    fn term_frequency_iteration_is_insertion_ordered() {
        let mut tf = TermFrequency::new();
        tf.add_terms(&["zebra", "apple", "zebra", "mango"]);
        let order: Vec<&str> = tf.iter().map(|(t, _)| t).collect();
        assert_eq!(order, vec!["zebra", "apple", "mango"]);
    }
}
