use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Data source error: {0}")]
    DataSource(#[from] catalog_corpus::CorpusError),

    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] catalog_vector_store::VectorStoreError),

    #[error("No catalog item matches {0:?}")]
    NotFound(String),

    #[error("Similarity matrix is not available")]
    SimilarityUnavailable,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SearchError {
    /// User-facing "nothing matched" conditions, as opposed to engine faults.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
