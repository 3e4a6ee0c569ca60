use crate::autocomplete::suggest;
use crate::config::EngineConfig;
use crate::error::{Result, SearchError};
use crate::ranker::rank;
use crate::resolver::resolve;
use catalog_corpus::{Corpus, Item};
use catalog_protocol::{DisplayRecord, EngineStats, Recommendation, RESPONSE_SCHEMA_VERSION};
use catalog_vector_store::{EncodedMatrix, SimilarityMatrix, Vectorizer, Vocabulary};
use std::time::Instant;

/// Everything the request path reads. Built once, then only shared.
#[derive(Debug)]
pub struct EngineState {
    corpus: Corpus,
    vocabulary: Vocabulary,
    encoded: EncodedMatrix,
    similarity: Option<SimilarityMatrix>,
}

/// Loads the feed named in `config` and builds the engine.
///
/// Feed failures are fatal. A similarity build failure is logged and leaves
/// the engine serving autocomplete only.
pub fn initialize(config: &EngineConfig) -> Result<EngineState> {
    config.validate()?;
    let corpus = Corpus::load(&config.source_path, config.max_rows)?;
    EngineState::build(corpus, config.max_features)
}

impl EngineState {
    pub fn build(corpus: Corpus, max_features: usize) -> Result<Self> {
        let started = Instant::now();
        let (vocabulary, encoded) = Vectorizer::new(max_features)?.fit(&corpus)?;
        let similarity = match SimilarityMatrix::build(&encoded) {
            Ok(matrix) => Some(matrix),
            Err(err) => {
                log::error!("Similarity matrix unavailable, recommendations disabled: {err}");
                None
            }
        };
        log::info!(
            "Engine ready: {} items, {} terms in {:?}",
            corpus.len(),
            vocabulary.len(),
            started.elapsed()
        );
        Ok(Self {
            corpus,
            vocabulary,
            encoded,
            similarity,
        })
    }

    /// State without a similarity matrix; only autocomplete is served.
    pub fn without_similarity(corpus: Corpus, max_features: usize) -> Result<Self> {
        let (vocabulary, encoded) = Vectorizer::new(max_features)?.fit(&corpus)?;
        Ok(Self {
            corpus,
            vocabulary,
            encoded,
            similarity: None,
        })
    }

    pub fn recommend(&self, query: Option<&str>, top_n: usize) -> Result<Recommendation> {
        let anchor_id = resolve(&self.corpus, query)?;
        let similarity = self
            .similarity
            .as_ref()
            .ok_or(SearchError::SimilarityUnavailable)?;
        let anchor = self
            .corpus
            .get(anchor_id)
            .ok_or_else(|| SearchError::NotFound(query.unwrap_or_default().to_string()))?;

        let suggestions = rank(similarity, anchor_id, top_n)
            .into_iter()
            .filter_map(|(row_id, _)| self.corpus.get(row_id))
            .map(display_record)
            .collect();

        Ok(Recommendation {
            anchor: display_record(anchor),
            background: background_image(anchor),
            suggestions,
        })
    }

    #[must_use]
    pub fn autocomplete(&self, prefix: &str, limit: usize) -> Vec<String> {
        suggest(&self.corpus, prefix, limit)
    }

    #[must_use]
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            schema_version: RESPONSE_SCHEMA_VERSION,
            corpus_items: self.corpus.len(),
            vocabulary_terms: self.vocabulary.len(),
            similarity_ready: self.similarity.is_some(),
        }
    }

    #[must_use]
    pub const fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    #[must_use]
    pub const fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    #[must_use]
    pub const fn encoded(&self) -> &EncodedMatrix {
        &self.encoded
    }

    #[must_use]
    pub const fn similarity(&self) -> Option<&SimilarityMatrix> {
        self.similarity.as_ref()
    }
}

fn display_record(item: &Item) -> DisplayRecord {
    DisplayRecord {
        title: item.name.clone(),
        image_url: item.image_url.clone(),
        genres: item.genres.clone(),
        score: item.score,
    }
}

fn background_image(item: &Item) -> Option<String> {
    item.image_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}
