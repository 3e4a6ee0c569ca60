use catalog_protocol::ErrorEnvelope;
use catalog_search::SearchError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub action: CommandAction,
    #[serde(default = "empty_payload")]
    pub payload: Value,
}

fn empty_payload() -> Value {
    Value::Object(Default::default())
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandAction {
    Recommend,
    Autocomplete,
    Stats,
}

impl CommandAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Recommend => "recommend",
            Self::Autocomplete => "autocomplete",
            Self::Stats => "stats",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecommendPayload {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub top_n: Option<usize>,
    /// Use the larger "load more" page size when `top_n` is not given.
    #[serde(default)]
    pub load_more: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AutocompletePayload {
    #[serde(alias = "prefix")]
    pub query: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Clone)]
pub struct CommandResponse {
    pub status: CommandStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorEnvelope>,
    pub data: Value,
    pub meta: ResponseMeta,
}

impl CommandResponse {
    pub fn is_error(&self) -> bool {
        matches!(self.status, CommandStatus::Error)
    }

    pub fn error_code(&self) -> Option<&str> {
        self.error.as_ref().map(|err| err.code.as_str())
    }

    pub fn ok(data: Value, meta: ResponseMeta) -> Self {
        Self {
            status: CommandStatus::Ok,
            message: None,
            error: None,
            data,
            meta,
        }
    }

    pub fn error(code: &str, message: String, hint: Option<String>, meta: ResponseMeta) -> Self {
        Self {
            status: CommandStatus::Error,
            message: Some(message.clone()),
            error: Some(ErrorEnvelope {
                code: code.to_string(),
                message,
                details: None,
                hint,
            }),
            data: Value::Null,
            meta,
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Ok,
    Error,
}

#[derive(Debug, Serialize, Clone, Default)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpus_items: Option<usize>,
}

pub struct ErrorClassification {
    pub code: &'static str,
    pub hint: Option<String>,
}

pub fn classify_error(err: &SearchError) -> ErrorClassification {
    match err {
        SearchError::NotFound(_) => ErrorClassification {
            code: "not_found",
            hint: Some(
                "Try a shorter part of the title; matching is case-insensitive substring."
                    .to_string(),
            ),
        },
        SearchError::InvalidConfig(_) => ErrorClassification {
            code: "invalid_request",
            hint: None,
        },
        SearchError::SimilarityUnavailable => ErrorClassification {
            code: "unavailable",
            hint: Some("Autocomplete is still served; check the server log.".to_string()),
        },
        SearchError::DataSource(_) | SearchError::VectorStoreError(_) => ErrorClassification {
            code: "internal",
            hint: None,
        },
    }
}

pub fn parse_payload<T: DeserializeOwned>(payload: Value) -> Result<T, serde_json::Error> {
    serde_json::from_value(payload)
}
