//! Voyage AI embeddings client.
//!
//! Calls `POST <base_url>/v1/embeddings` with `{"input": [text], "model": m}`
//! and a bearer token, and returns the first embedding of the response:
//!
//! ```text
//! { "data": [ { "embedding": [0.12, -0.03, ...] } ] }
//! ```
//!
//! One attempt per call, bounded by `embedding.timeout_secs` (10 s default).
//! Any failure is reported to the caller as a [`CliError`]; nothing is
//! retried.

use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::EmbeddingSettings;
use crate::error::CliError;
use crate::models::SearchParams;

/// Environment variable consulted when no API key is configured.
pub const VOYAGE_API_KEY_ENV: &str = "VOYAGE_API_KEY";

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f64>,
}

/// HTTP client bound to one API key and model.
pub struct VoyageClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl VoyageClient {
    /// Build a client. Fails with [`CliError::EmbeddingAuth`] when `api_key`
    /// is empty. An empty `model` falls back to the settings default.
    pub fn new(
        settings: &EmbeddingSettings,
        api_key: &str,
        model: &str,
    ) -> Result<Self, CliError> {
        if api_key.trim().is_empty() {
            return Err(CliError::EmbeddingAuth);
        }

        let http = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| CliError::EmbeddingRequest(e.to_string()))?;

        let model = if model.is_empty() {
            settings.model.clone()
        } else {
            model.to_string()
        };

        Ok(Self {
            http,
            endpoint: format!("{}/v1/embeddings", settings.base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Embed a single text.
    pub async fn embed(&self, text: &str) -> Result<Vec<f64>, CliError> {
        let body = serde_json::json!({
            "input": [text],
            "model": self.model,
        });

        tracing::debug!(endpoint = %self.endpoint, model = %self.model, "requesting embedding");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CliError::EmbeddingRequest(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CliError::EmbeddingRequest(e.to_string()))?;

        if status != StatusCode::OK {
            return Err(CliError::EmbeddingUpstream {
                status: status.as_u16(),
                body: text,
            });
        }

        let vector = parse_embedding_response(&text)?;
        tracing::debug!(dims = vector.len(), "received embedding");
        Ok(vector)
    }
}

/// Extract the first embedding from a response body.
pub fn parse_embedding_response(body: &str) -> Result<Vec<f64>, CliError> {
    let parsed: EmbeddingResponse =
        serde_json::from_str(body).map_err(|e| CliError::EmbeddingParse(e.to_string()))?;

    match parsed.data.into_iter().next() {
        Some(item) if !item.embedding.is_empty() => Ok(item.embedding),
        _ => Err(CliError::EmbeddingEmpty),
    }
}

/// The API key to use: the merged `voyageAPIKey` (flag over config), else
/// the value of [`VOYAGE_API_KEY_ENV`]. Empty when neither is set.
pub fn resolve_api_key(params: &SearchParams, env_value: Option<String>) -> String {
    if !params.voyage_api_key.is_empty() {
        return params.voyage_api_key.clone();
    }
    env_value.unwrap_or_default()
}

/// The model to use: the merged `voyageModel`, else the settings default.
pub fn resolve_model(params: &SearchParams, settings: &EmbeddingSettings) -> String {
    if params.voyage_model.is_empty() {
        settings.model.clone()
    } else {
        params.voyage_model.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::time::Duration;

    async fn spawn_mock(router: Router) -> EmbeddingSettings {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });
        EmbeddingSettings {
            base_url: format!("http://{}", addr),
            timeout_secs: 1,
            ..Default::default()
        }
    }

    async fn embed(
        settings: &EmbeddingSettings,
        text: &str,
        api_key: &str,
        model: &str,
    ) -> Result<Vec<f64>, CliError> {
        VoyageClient::new(settings, api_key, model)?.embed(text).await
    }

    async fn checked_embeddings(
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (axum::http::StatusCode, Json<Value>) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if auth != "Bearer test-key" {
            return (
                axum::http::StatusCode::UNAUTHORIZED,
                Json(json!({"detail": "Provided API key is invalid."})),
            );
        }
        if body != json!({"input": ["hello"], "model": "voyage-3.5"}) {
            return (
                axum::http::StatusCode::BAD_REQUEST,
                Json(json!({"detail": "unexpected body"})),
            );
        }
        let response = json!({
            "object": "list",
            "data": [{"object": "embedding", "embedding": [0.1, 0.2, 0.3], "index": 0}],
            "model": "voyage-3.5"
        });
        (axum::http::StatusCode::OK, Json(response))
    }

    #[test]
    fn parse_valid_response() {
        let v = parse_embedding_response(r#"{"data":[{"embedding":[1.5,-2]}]}"#).unwrap();
        assert_eq!(v, vec![1.5, -2.0]);
    }

    #[test]
    fn parse_wrong_shape() {
        let err = parse_embedding_response(r#"{"embeddings":[[1.0]]}"#).unwrap_err();
        assert!(matches!(err, CliError::EmbeddingParse(_)));
        let err = parse_embedding_response("not json").unwrap_err();
        assert!(matches!(err, CliError::EmbeddingParse(_)));
    }

    #[test]
    fn parse_empty_data_or_vector() {
        assert!(matches!(
            parse_embedding_response(r#"{"data":[]}"#),
            Err(CliError::EmbeddingEmpty)
        ));
        assert!(matches!(
            parse_embedding_response(r#"{"data":[{"embedding":[]}]}"#),
            Err(CliError::EmbeddingEmpty)
        ));
    }

    #[test]
    fn empty_key_is_auth_error() {
        let settings = EmbeddingSettings::default();
        assert!(matches!(
            VoyageClient::new(&settings, "", "voyage-3.5"),
            Err(CliError::EmbeddingAuth)
        ));
    }

    #[test]
    fn empty_model_uses_default() {
        let settings = EmbeddingSettings::default();
        let client = VoyageClient::new(&settings, "k", "").unwrap();
        assert_eq!(client.model(), "voyage-3.5");
    }

    #[test]
    fn api_key_precedence() {
        let mut params = SearchParams::default();
        assert_eq!(resolve_api_key(&params, None), "");
        assert_eq!(resolve_api_key(&params, Some("env".into())), "env");
        params.voyage_api_key = "cfg".into();
        assert_eq!(resolve_api_key(&params, Some("env".into())), "cfg");
    }

    #[test]
    fn model_precedence() {
        let settings = EmbeddingSettings::default();
        let mut params = SearchParams::default();
        assert_eq!(resolve_model(&params, &settings), "voyage-3.5");
        params.voyage_model = "voyage-3-large".into();
        assert_eq!(resolve_model(&params, &settings), "voyage-3-large");
    }

    #[tokio::test]
    async fn embed_sends_expected_request() {
        let router = Router::new().route("/v1/embeddings", post(checked_embeddings));
        let settings = spawn_mock(router).await;

        let vector = embed(&settings, "hello", "test-key", "voyage-3.5")
            .await
            .unwrap();
        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn non_200_is_upstream_error_with_body() {
        let router = Router::new().route("/v1/embeddings", post(checked_embeddings));
        let settings = spawn_mock(router).await;

        let err = embed(&settings, "hello", "wrong-key", "voyage-3.5")
            .await
            .unwrap_err();
        match err {
            CliError::EmbeddingUpstream { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("invalid"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_success_body_is_parse_error() {
        let router = Router::new().route(
            "/v1/embeddings",
            post(|| async { Json(json!({"data": "nope"})) }),
        );
        let settings = spawn_mock(router).await;

        let err = embed(&settings, "hello", "k", "m").await.unwrap_err();
        assert!(matches!(err, CliError::EmbeddingParse(_)));
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let router = Router::new().route(
            "/v1/embeddings",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!({"data": [{"embedding": [1.0]}]}))
            }),
        );
        let settings = spawn_mock(router).await;

        let err = embed(&settings, "hello", "k", "m").await.unwrap_err();
        assert!(matches!(err, CliError::EmbeddingRequest(_)));
    }
}
