use thiserror::Error;

pub type Result<T> = std::result::Result<T, VectorStoreError>;

#[derive(Error, Debug)]
pub enum VectorStoreError {
    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Corpus too large for an all-pairs matrix: {rows} rows (limit {limit})")]
    CorpusTooLarge { rows: usize, limit: usize },

    #[error("Invalid vectorizer setting: {0}")]
    InvalidSetting(String),
}
