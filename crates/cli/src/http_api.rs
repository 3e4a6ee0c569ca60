use crate::command::{CommandHandler, CommandRequest, CommandResponse, ResponseMeta};
use axum::{
    body::{Body, Bytes},
    extract::{rejection::QueryRejection, Query, State},
    http::{Response as HttpResponse, StatusCode},
    response::Response,
    routing::{get, post},
    Router,
};
use catalog_protocol::serialize_json;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub(crate) struct RecommendQuery {
    q: Option<String>,
    top_n: Option<usize>,
    #[serde(default)]
    load_more: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AutocompleteQuery {
    #[serde(default)]
    q: String,
    limit: Option<usize>,
}

pub(crate) fn router(handler: CommandHandler) -> Router {
    Router::new()
        .route("/command", post(command_handler))
        .route("/recommend", get(recommend_handler))
        .route("/autocomplete", get(autocomplete_handler))
        .route("/health", get(health_handler))
        .with_state(handler)
}

async fn command_handler(
    State(handler): State<CommandHandler>,
    body: Bytes,
) -> Result<Response, StatusCode> {
    let request: CommandRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            let response = error_response("invalid_request", format!("Invalid JSON request: {err}"));
            return build_response(StatusCode::BAD_REQUEST, &response);
        }
    };
    let response = handler.execute(request);
    build_response(StatusCode::OK, &response)
}

async fn recommend_handler(
    State(handler): State<CommandHandler>,
    query: Result<Query<RecommendQuery>, QueryRejection>,
) -> Result<Response, StatusCode> {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return reject_query(&rejection),
    };
    let request = CommandRequest {
        action: crate::command::CommandAction::Recommend,
        payload: json!({
            "query": query.q,
            "top_n": query.top_n,
            "load_more": query.load_more,
        }),
    };
    let response = handler.execute(request);
    build_response(status_for(&response), &response)
}

async fn autocomplete_handler(
    State(handler): State<CommandHandler>,
    query: Result<Query<AutocompleteQuery>, QueryRejection>,
) -> Result<Response, StatusCode> {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return reject_query(&rejection),
    };
    let request = CommandRequest {
        action: crate::command::CommandAction::Autocomplete,
        payload: json!({ "query": query.q, "limit": query.limit }),
    };
    let response = handler.execute(request);
    build_response(status_for(&response), &response)
}

fn reject_query(rejection: &QueryRejection) -> Result<Response, StatusCode> {
    let response = error_response(
        "invalid_request",
        format!("Invalid query string: {}", rejection.body_text()),
    );
    build_response(StatusCode::BAD_REQUEST, &response)
}

async fn health_handler(State(handler): State<CommandHandler>) -> Result<Response, StatusCode> {
    let stats = handler.state().stats();
    let data = serde_json::to_value(stats).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let response = CommandResponse::ok(data, ResponseMeta::default());
    build_response(StatusCode::OK, &response)
}

pub(crate) fn error_response(code: &str, message: String) -> CommandResponse {
    let hint = match code {
        "invalid_request" => {
            Some("Verify the request is valid JSON and matches the Command API schema.".to_string())
        }
        _ => None,
    };
    CommandResponse::error(code, message, hint, ResponseMeta::default())
}

/// HTTP status for the query-string endpoints; `/command` always answers 200.
pub(crate) fn status_for(response: &CommandResponse) -> StatusCode {
    match response.error_code() {
        None => StatusCode::OK,
        Some("not_found") => StatusCode::NOT_FOUND,
        Some("invalid_request") => StatusCode::BAD_REQUEST,
        Some("unavailable") => StatusCode::SERVICE_UNAVAILABLE,
        Some(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn build_response(
    status: StatusCode,
    response: &CommandResponse,
) -> Result<Response, StatusCode> {
    let bytes = serialize_json(response)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .into_bytes();

    HttpResponse::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(bytes))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::RequestDefaults;
    use axum::http::Request;
    use catalog_corpus::{Corpus, FeedRow};
    use catalog_search::{EngineConfig, EngineState};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        let corpus = Corpus::from_rows(
            vec![
                FeedRow::new("Naruto", "Action Adventure").image_url("https://img/n.jpg"),
                FeedRow::new("Bleach", "Action Adventure"),
                FeedRow::new("Clannad", "Drama Romance"),
            ],
            100,
        );
        let state = EngineState::build(corpus, 1000).unwrap();
        router(CommandHandler::new(
            Arc::new(state),
            RequestDefaults::from(&EngineConfig::default()),
        ))
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn recommend_endpoint_returns_ranked_suggestions() {
        let (status, body) = call(app(), get("/recommend?q=naru&top_n=2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["anchor"]["title"], "Naruto");
        assert_eq!(body["data"]["background"], "https://img/n.jpg");
        assert_eq!(body["data"]["suggestions"][0]["title"], "Bleach");
        assert_eq!(body["data"]["suggestions"][1]["title"], "Clannad");
        assert!(body["data"]["suggestions"][1]["score"].is_null());
    }

    #[tokio::test]
    async fn recommend_endpoint_maps_not_found_to_404() {
        let (status, body) = call(app(), get("/recommend?q=one%20piece")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "not_found");

        let (status, _) = call(app(), get("/recommend")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn autocomplete_endpoint_lists_titles() {
        let (status, body) = call(app(), get("/autocomplete?q=NA")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], serde_json::json!(["Naruto", "Clannad"]));
    }

    #[tokio::test]
    async fn malformed_query_string_gets_json_envelope() {
        let (status, body) = call(app(), get("/recommend?q=naru&top_n=abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"]["code"], "invalid_request");

        let (status, body) = call(app(), get("/autocomplete?q=na&limit=-1")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_request");
    }

    #[tokio::test]
    async fn zero_top_n_is_a_bad_request() {
        let (status, body) = call(app(), get("/recommend?q=naru&top_n=0")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_request");
    }

    #[tokio::test]
    async fn command_endpoint_rejects_invalid_json() {
        let request = Request::builder()
            .method("POST")
            .uri("/command")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = call(app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_request");
    }

    #[tokio::test]
    async fn health_reports_stats() {
        let (status, body) = call(app(), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["corpus_items"], 3);
        assert_eq!(body["data"]["similarity_ready"], true);
    }
}
