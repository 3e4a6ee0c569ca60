use crate::error::{Result, SearchError};
use catalog_corpus::DEFAULT_MAX_ROWS;
use catalog_vector_store::{DEFAULT_MAX_FEATURES, MAX_ROWS_CEILING};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_SOURCE_PATH: &str = "anime_data.csv";
pub const DEFAULT_TOP_N: usize = 12;
pub const LOAD_MORE_TOP_N: usize = 18;
pub const DEFAULT_SUGGEST_LIMIT: usize = 10;

pub const ENV_CONFIG_PATH: &str = "CATALOG_REC_CONFIG";
pub const ENV_SOURCE: &str = "CATALOG_REC_SOURCE";
pub const ENV_MAX_ROWS: &str = "CATALOG_REC_MAX_ROWS";
pub const ENV_MAX_FEATURES: &str = "CATALOG_REC_MAX_FEATURES";

/// Engine settings. Layers: defaults, then a TOML file, then environment,
/// then whatever the caller sets explicitly.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub source_path: PathBuf,
    pub max_rows: usize,
    pub max_features: usize,
    pub top_n: usize,
    pub load_more_top_n: usize,
    pub suggest_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(DEFAULT_SOURCE_PATH),
            max_rows: DEFAULT_MAX_ROWS,
            max_features: DEFAULT_MAX_FEATURES,
            top_n: DEFAULT_TOP_N,
            load_more_top_n: LOAD_MORE_TOP_N,
            suggest_limit: DEFAULT_SUGGEST_LIMIT,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|err| SearchError::InvalidConfig(err.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            SearchError::InvalidConfig(format!("cannot read {}: {err}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Loads the file named by `CATALOG_REC_CONFIG` (if any) and applies
    /// environment overrides on top.
    pub fn from_env() -> Result<Self> {
        let base = match std::env::var_os(ENV_CONFIG_PATH) {
            Some(path) => Self::from_file(PathBuf::from(path))?,
            None => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `CATALOG_REC_*` overrides read through `lookup`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(source) = lookup(ENV_SOURCE).filter(|v| !v.trim().is_empty()) {
            self.source_path = PathBuf::from(source);
        }
        if let Some(raw) = lookup(ENV_MAX_ROWS) {
            self.max_rows = parse_count(ENV_MAX_ROWS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_FEATURES) {
            self.max_features = parse_count(ENV_MAX_FEATURES, &raw)?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_rows == 0 || self.max_rows > MAX_ROWS_CEILING {
            return Err(SearchError::InvalidConfig(format!(
                "max_rows must be within 1..={MAX_ROWS_CEILING} (got {})",
                self.max_rows
            )));
        }
        for (key, value) in [
            ("max_features", self.max_features),
            ("top_n", self.top_n),
            ("load_more_top_n", self.load_more_top_n),
            ("suggest_limit", self.suggest_limit),
        ] {
            if value == 0 {
                return Err(SearchError::InvalidConfig(format!(
                    "{key} must be at least 1"
                )));
            }
        }
        Ok(())
    }
}

fn parse_count(key: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| SearchError::InvalidConfig(format!("{key}={raw:?} is not a count")))
}
