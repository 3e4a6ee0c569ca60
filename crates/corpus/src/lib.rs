//! # Catalog Corpus
//!
//! Reads the catalog feed (CSV with `name`, `genres`, `image_url` and an
//! optional `score` column) into an ordered, immutable [`Corpus`].
//!
//! Only the first `max_rows` rows are kept. Every structure derived from the
//! corpus downstream is sized by this cap, the all-pairs similarity matrix
//! quadratically so.

mod corpus;
mod error;
mod feed;
mod types;

pub use corpus::{fold_case, Corpus, DEFAULT_MAX_ROWS};
pub use error::{CorpusError, Result};
pub use feed::{read_rows, FeedRow};
pub use types::Item;
