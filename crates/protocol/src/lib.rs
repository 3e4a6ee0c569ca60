use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const RESPONSE_SCHEMA_VERSION: u32 = 1;

/// What a caller renders for one catalog item.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DisplayRecord {
    pub title: String,
    pub image_url: Option<String>,
    pub genres: String,
    /// Absent scores stay absent (`null`), never a sentinel number.
    pub score: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Recommendation {
    pub anchor: DisplayRecord,
    /// Anchor artwork for page backgrounds; `None` when blank or missing.
    pub background: Option<String>,
    pub suggestions: Vec<DisplayRecord>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct EngineStats {
    pub schema_version: u32,
    pub corpus_items: usize,
    pub vocabulary_terms: usize,
    pub similarity_ready: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
    pub hint: Option<String>,
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn absent_fields_serialize_as_null() {
        let record = DisplayRecord {
            title: "Clannad".to_string(),
            image_url: None,
            genres: "Drama Romance".to_string(),
            score: None,
        };
        let value: serde_json::Value =
            serde_json::from_str(&serialize_json(&record).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "title": "Clannad",
                "image_url": null,
                "genres": "Drama Romance",
                "score": null,
            })
        );
    }
}
