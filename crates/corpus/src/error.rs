use thiserror::Error;

pub type Result<T> = std::result::Result<T, CorpusError>;

/// Failures reading the catalog feed. All of them are fatal at startup.
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Data source unreadable ({origin}): {source}")]
    Unreadable {
        origin: String,
        #[source]
        source: csv::Error,
    },

    #[error("Data source is missing required column `{0}`")]
    MissingColumn(&'static str),

    #[error("Malformed record at line {line}: {source}")]
    Malformed {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("Cannot open data source {origin}: {source}")]
    Open {
        origin: String,
        #[source]
        source: std::io::Error,
    },
}
