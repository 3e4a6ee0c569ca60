use crate::error::{Result, VectorStoreError};
use catalog_corpus::Corpus;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

/// Default vocabulary cap.
pub const DEFAULT_MAX_FEATURES: usize = 1000;

static TOKEN_PATTERN: OnceLock<Regex> = OnceLock::new();

fn token_pattern() -> &'static Regex {
    // Two or more word characters, same shape as a classic bag-of-words tokenizer.
    TOKEN_PATTERN.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("static token pattern"))
}

/// Splits a category string into case-folded tokens, in order of appearance.
pub fn tokenize(genres: &str) -> impl Iterator<Item = String> + '_ {
    token_pattern()
        .find_iter(genres)
        .map(|m| m.as_str().to_lowercase())
}

/// Token → column mapping. Columns follow lexicographic token order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    terms: Vec<String>,
    columns: HashMap<String, usize>,
}

impl Vocabulary {
    fn from_terms(mut terms: Vec<String>) -> Self {
        terms.sort_unstable();
        let columns = terms
            .iter()
            .enumerate()
            .map(|(col, term)| (term.clone(), col))
            .collect();
        Self { terms, columns }
    }

    #[must_use]
    pub fn column(&self, token: &str) -> Option<usize> {
        self.columns.get(token).copied()
    }

    #[must_use]
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// One encoded item: `(column, count)` pairs sorted by column, zeros omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseRow {
    entries: Vec<(usize, u32)>,
}

impl SparseRow {
    #[must_use]
    pub fn entries(&self) -> &[(usize, u32)] {
        &self.entries
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of squared counts.
    #[must_use]
    pub fn squared_norm(&self) -> u64 {
        self.entries
            .iter()
            .map(|&(_, count)| u64::from(count) * u64::from(count))
            .sum()
    }
}

/// Sparse count matrix, one row per corpus item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedMatrix {
    rows: Vec<SparseRow>,
    n_cols: usize,
}

impl EncodedMatrix {
    /// Builds a matrix from raw `(column, count)` rows, rejecting columns
    /// outside `n_cols`. Duplicate columns are summed, zero counts dropped.
    pub fn from_rows(rows: Vec<Vec<(usize, u32)>>, n_cols: usize) -> Result<Self> {
        let mut encoded = Vec::with_capacity(rows.len());
        for raw in rows {
            let mut merged: BTreeMap<usize, u32> = BTreeMap::new();
            for (col, count) in raw {
                if col >= n_cols {
                    return Err(VectorStoreError::InvalidDimension {
                        expected: n_cols,
                        actual: col + 1,
                    });
                }
                *merged.entry(col).or_default() += count;
            }
            encoded.push(SparseRow {
                entries: merged.into_iter().filter(|&(_, c)| c > 0).collect(),
            });
        }
        Ok(Self {
            rows: encoded,
            n_cols,
        })
    }

    #[must_use]
    pub fn rows(&self) -> &[SparseRow] {
        &self.rows
    }

    #[must_use]
    pub fn row(&self, idx: usize) -> Option<&SparseRow> {
        self.rows.get(idx)
    }

    /// `(rows, columns)`
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.n_cols)
    }

    /// Number of stored non-zero entries.
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(|r| r.entries.len()).sum()
    }
}

/// Bag-of-categories encoder with a frequency-bounded vocabulary.
#[derive(Debug, Clone, Copy)]
pub struct Vectorizer {
    max_features: usize,
}

impl Vectorizer {
    pub fn new(max_features: usize) -> Result<Self> {
        if max_features == 0 {
            return Err(VectorStoreError::InvalidSetting(
                "max_features must be at least 1".to_string(),
            ));
        }
        Ok(Self { max_features })
    }

    /// Learns the vocabulary from the corpus and encodes every item against it.
    ///
    /// The `max_features` most frequent tokens (total occurrences across the
    /// corpus) are retained; equal counts keep the token seen first in corpus
    /// order. Out-of-vocabulary tokens are dropped from the encoding.
    pub fn fit(&self, corpus: &Corpus) -> Result<(Vocabulary, EncodedMatrix)> {
        let tokenized: Vec<Vec<String>> = corpus
            .items()
            .iter()
            .map(|item| tokenize(&item.genres).collect())
            .collect();

        // (token, total count), in first-seen order.
        let mut seen: Vec<(&str, u64)> = Vec::new();
        let mut slot: HashMap<&str, usize> = HashMap::new();
        for token in tokenized.iter().flatten() {
            let idx = *slot.entry(token.as_str()).or_insert_with(|| {
                seen.push((token.as_str(), 0));
                seen.len() - 1
            });
            seen[idx].1 += 1;
        }

        // Stable sort keeps first-seen order among equal counts.
        seen.sort_by(|a, b| b.1.cmp(&a.1));
        if seen.len() > self.max_features {
            log::debug!(
                "Vocabulary capped at {} of {} distinct tokens",
                self.max_features,
                seen.len()
            );
        }
        seen.truncate(self.max_features);

        let vocabulary =
            Vocabulary::from_terms(seen.into_iter().map(|(t, _)| t.to_string()).collect());

        let rows = tokenized
            .iter()
            .map(|tokens| {
                tokens
                    .iter()
                    .filter_map(|t| vocabulary.column(t))
                    .map(|col| (col, 1))
                    .collect()
            })
            .collect();
        let encoded = EncodedMatrix::from_rows(rows, vocabulary.len())?;

        log::info!(
            "Encoded {} items over {} vocabulary terms ({} non-zero entries)",
            encoded.shape().0,
            vocabulary.len(),
            encoded.nnz()
        );
        Ok((vocabulary, encoded))
    }
}

impl Default for Vectorizer {
    fn default() -> Self {
        Self {
            max_features: DEFAULT_MAX_FEATURES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_corpus::FeedRow;
    use pretty_assertions::assert_eq;

    fn corpus(genres: &[&str]) -> Corpus {
        Corpus::from_rows(
            genres
                .iter()
                .enumerate()
                .map(|(i, g)| FeedRow::new(format!("Item {i}"), *g)),
            100,
        )
    }

    #[test]
    fn tokenizes_like_a_word_counter() {
        let tokens: Vec<String> = tokenize("Action, Sci-Fi, Slice of Life, A").collect();
        assert_eq!(tokens, vec!["action", "sci", "fi", "slice", "of", "life"]);
    }

    #[test]
    fn encodes_raw_counts_over_sorted_vocabulary() {
        let corpus = corpus(&["Drama Action", "action ACTION", ""]);
        let (vocab, encoded) = Vectorizer::default().fit(&corpus).unwrap();

        assert_eq!(vocab.terms(), &["action".to_string(), "drama".to_string()]);
        assert_eq!(encoded.shape(), (3, 2));
        assert_eq!(encoded.row(0).unwrap().entries(), &[(0, 1), (1, 1)]);
        assert_eq!(encoded.row(1).unwrap().entries(), &[(0, 2)]);
        assert!(encoded.row(2).unwrap().is_zero());
    }

    #[test]
    fn keeps_most_frequent_tokens_with_first_seen_tie_break() {
        // comedy: 3, zombie: 1 (seen before horror), horror: 1
        let corpus = corpus(&["Zombie Comedy", "Comedy Horror", "Comedy"]);
        let (vocab, encoded) = Vectorizer::new(2).unwrap().fit(&corpus).unwrap();

        assert_eq!(vocab.terms(), &["comedy".to_string(), "zombie".to_string()]);
        assert_eq!(vocab.column("horror"), None);
        // horror is silently dropped
        assert_eq!(encoded.row(1).unwrap().entries(), &[(0, 1)]);
    }

    #[test]
    fn fit_is_deterministic() {
        let corpus = corpus(&["Mecha Space", "Space Opera", "Opera Mecha Music"]);
        let vectorizer = Vectorizer::new(3).unwrap();
        assert_eq!(vectorizer.fit(&corpus).unwrap(), vectorizer.fit(&corpus).unwrap());
    }

    #[test]
    fn rejects_zero_max_features() {
        assert!(Vectorizer::new(0).is_err());
    }

    #[test]
    fn from_rows_rejects_out_of_range_columns() {
        let err = EncodedMatrix::from_rows(vec![vec![(3, 1)]], 2).unwrap_err();
        assert!(matches!(
            err,
            VectorStoreError::InvalidDimension {
                expected: 2,
                actual: 4
            }
        ));
    }
}
