pub mod domain;

pub use domain::{
    classify_error, AutocompletePayload, CommandAction, CommandRequest, CommandResponse,
    RecommendPayload, ResponseMeta,
};

use catalog_search::{EngineConfig, EngineState, SearchError};
use domain::parse_payload;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Page sizes used when a request leaves them out.
#[derive(Debug, Clone, Copy)]
pub struct RequestDefaults {
    pub top_n: usize,
    pub load_more_top_n: usize,
    pub suggest_limit: usize,
}

impl From<&EngineConfig> for RequestDefaults {
    fn from(config: &EngineConfig) -> Self {
        Self {
            top_n: config.top_n,
            load_more_top_n: config.load_more_top_n,
            suggest_limit: config.suggest_limit,
        }
    }
}

/// Executes Command API requests against a shared, already built engine.
#[derive(Clone)]
pub struct CommandHandler {
    state: Arc<EngineState>,
    defaults: RequestDefaults,
}

enum Failure {
    BadPayload(serde_json::Error),
    OutOfRange(&'static str),
    Encode(serde_json::Error),
    Engine(SearchError),
}

impl CommandHandler {
    pub fn new(state: Arc<EngineState>, defaults: RequestDefaults) -> Self {
        Self { state, defaults }
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn execute(&self, request: CommandRequest) -> CommandResponse {
        let started = Instant::now();
        let CommandRequest { action, payload } = request;

        let outcome = match action {
            CommandAction::Recommend => self.recommend(payload),
            CommandAction::Autocomplete => self.autocomplete(payload),
            CommandAction::Stats => {
                serde_json::to_value(self.state.stats()).map_err(Failure::Encode)
            }
        };

        let meta = ResponseMeta {
            action: Some(action.as_str()),
            duration_ms: Some(started.elapsed().as_millis() as u64),
            corpus_items: Some(self.state.corpus().len()),
        };

        match outcome {
            Ok(data) => CommandResponse::ok(data, meta),
            Err(Failure::BadPayload(err)) => {
                log::debug!("Rejected {} payload: {err}", action.as_str());
                CommandResponse::error(
                    "invalid_request",
                    format!("Invalid {} payload: {err}", action.as_str()),
                    Some("Verify the payload matches the Command API schema.".to_string()),
                    meta,
                )
            }
            Err(Failure::OutOfRange(field)) => CommandResponse::error(
                "invalid_request",
                format!("`{field}` must be at least 1"),
                Some(format!("Omit `{field}` to use the configured default.")),
                meta,
            ),
            Err(Failure::Encode(err)) => {
                log::error!("Failed to encode {} response: {err}", action.as_str());
                CommandResponse::error("internal", err.to_string(), None, meta)
            }
            Err(Failure::Engine(err)) => {
                let class = classify_error(&err);
                if class.code == "internal" {
                    log::error!("{} failed: {err}", action.as_str());
                }
                CommandResponse::error(class.code, err.to_string(), class.hint, meta)
            }
        }
    }

    fn recommend(&self, payload: Value) -> Result<Value, Failure> {
        let payload: RecommendPayload = parse_payload(payload).map_err(Failure::BadPayload)?;
        let top_n = payload.top_n.unwrap_or(if payload.load_more {
            self.defaults.load_more_top_n
        } else {
            self.defaults.top_n
        });
        if top_n == 0 {
            return Err(Failure::OutOfRange("top_n"));
        }

        let recommendation = self
            .state
            .recommend(payload.query.as_deref(), top_n)
            .map_err(Failure::Engine)?;
        serde_json::to_value(recommendation).map_err(Failure::Encode)
    }

    fn autocomplete(&self, payload: Value) -> Result<Value, Failure> {
        let payload: AutocompletePayload = parse_payload(payload).map_err(Failure::BadPayload)?;
        let limit = payload.limit.unwrap_or(self.defaults.suggest_limit);
        if limit == 0 {
            return Err(Failure::OutOfRange("limit"));
        }
        Ok(Value::from(self.state.autocomplete(&payload.query, limit)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_corpus::{Corpus, FeedRow};
    use super::domain::CommandStatus;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn handler() -> CommandHandler {
        let corpus = Corpus::from_rows(
            (0..20).map(|i| FeedRow::new(format!("Show {i:02}"), "Action")),
            100,
        );
        let state = EngineState::build(corpus, 100).unwrap();
        CommandHandler::new(
            Arc::new(state),
            RequestDefaults::from(&EngineConfig::default()),
        )
    }

    fn request(raw: Value) -> CommandRequest {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn recommend_uses_base_and_load_more_page_sizes() {
        let handler = handler();

        let base = handler.execute(request(json!({
            "action": "recommend",
            "payload": {"query": "show 00"}
        })));
        assert_eq!(base.status, CommandStatus::Ok);
        assert_eq!(base.data["suggestions"].as_array().unwrap().len(), 12);

        let more = handler.execute(request(json!({
            "action": "recommend",
            "payload": {"query": "show 00", "load_more": true}
        })));
        assert_eq!(more.data["suggestions"].as_array().unwrap().len(), 18);
        assert_eq!(more.meta.corpus_items, Some(20));
    }

    #[test]
    fn unknown_title_is_not_found() {
        let response = handler().execute(request(json!({
            "action": "recommend",
            "payload": {"query": "nothing like this"}
        })));
        assert!(response.is_error());
        assert_eq!(response.error_code(), Some("not_found"));
    }

    #[test]
    fn autocomplete_honours_limit_and_min_length() {
        let handler = handler();
        let response = handler.execute(request(json!({
            "action": "autocomplete",
            "payload": {"query": "show", "limit": 3}
        })));
        assert_eq!(response.data, json!(["Show 00", "Show 01", "Show 02"]));

        let short = handler.execute(request(json!({
            "action": "autocomplete",
            "payload": {"query": "s"}
        })));
        assert_eq!(short.status, CommandStatus::Ok);
        assert_eq!(short.data, json!([]));
    }

    #[test]
    fn malformed_payload_is_invalid_request() {
        let response = handler().execute(request(json!({
            "action": "autocomplete",
            "payload": {"limit": "ten"}
        })));
        assert_eq!(response.error_code(), Some("invalid_request"));
    }

    #[test]
    fn zero_page_sizes_are_rejected() {
        let handler = handler();

        let recommend = handler.execute(request(json!({
            "action": "recommend",
            "payload": {"query": "show 00", "top_n": 0}
        })));
        assert_eq!(recommend.error_code(), Some("invalid_request"));
        assert!(recommend.message.unwrap().contains("top_n"));

        let autocomplete = handler.execute(request(json!({
            "action": "autocomplete",
            "payload": {"query": "show", "limit": 0}
        })));
        assert_eq!(autocomplete.error_code(), Some("invalid_request"));
        assert!(autocomplete.message.unwrap().contains("limit"));
    }

    #[test]
    fn stats_reports_engine_shape() {
        let response = handler().execute(request(json!({"action": "stats"})));
        assert_eq!(response.data["corpus_items"], json!(20));
        assert_eq!(response.data["vocabulary_terms"], json!(1));
        assert_eq!(response.data["similarity_ready"], json!(true));
    }
}
