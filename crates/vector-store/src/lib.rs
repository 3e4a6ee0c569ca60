//! # Catalog Vector Store
//!
//! Category-string vectorization and all-pairs similarity for the catalog.
//!
//! ## Architecture
//!
//! ```text
//! Corpus (genre strings)
//!     │
//!     ├──> Vectorizer
//!     │      ├─> Vocabulary   (top `max_features` tokens)
//!     │      └─> EncodedMatrix (sparse counts)
//!     │
//!     └──> SimilarityMatrix
//!            └─> dense cosine, |corpus| x |corpus|
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use catalog_corpus::Corpus;
//! use catalog_vector_store::{SimilarityMatrix, Vectorizer};
//!
//! fn main() -> anyhow::Result<()> {
//!     let corpus = Corpus::load("anime_data.csv", 7000)?;
//!     let (vocabulary, encoded) = Vectorizer::new(1000)?.fit(&corpus)?;
//!     let similarity = SimilarityMatrix::build(&encoded)?;
//!
//!     println!("{} terms, {} items", vocabulary.len(), similarity.len());
//!     Ok(())
//! }
//! ```

mod error;
mod similarity;
mod vectorizer;

pub use error::{Result, VectorStoreError};
pub use similarity::{SimilarityMatrix, MAX_ROWS_CEILING};
pub use vectorizer::{
    tokenize, EncodedMatrix, SparseRow, Vectorizer, Vocabulary, DEFAULT_MAX_FEATURES,
};
