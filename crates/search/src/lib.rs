//! # Catalog Search
//!
//! Request-side operations over an immutable [`EngineState`]: anchor
//! resolution, top-N ranking and title autocomplete.
//!
//! ```text
//! query ──> resolve ──> anchor row ──> rank ──> DisplayRecord[]
//! prefix ─> suggest ──> titles
//! ```

mod autocomplete;
mod config;
mod engine;
mod error;
mod ranker;
mod resolver;

pub use autocomplete::{suggest, MIN_QUERY_CHARS};
pub use config::{
    EngineConfig, DEFAULT_SOURCE_PATH, DEFAULT_SUGGEST_LIMIT, DEFAULT_TOP_N, ENV_CONFIG_PATH,
    ENV_MAX_FEATURES, ENV_MAX_ROWS, ENV_SOURCE, LOAD_MORE_TOP_N,
};
pub use engine::{initialize, EngineState};
pub use error::{Result, SearchError};
pub use ranker::rank;
pub use resolver::resolve;

pub use catalog_protocol::{DisplayRecord, EngineStats, Recommendation};
