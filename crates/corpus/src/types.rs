use serde::{Deserialize, Serialize};

/// A catalog entry. Row ids are assigned at load and stay stable for the
/// lifetime of the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub row_id: usize,
    pub name: String,
    /// Free-text category string; empty when the feed had none.
    pub genres: String,
    pub image_url: Option<String>,
    pub score: Option<f64>,
}
