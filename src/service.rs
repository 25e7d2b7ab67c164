//! Answer service client
//!
//! The wire contract is a single JSON exchange:
//! `POST {endpoint}` with `{"query": ...}` answered by
//! `{"answer": ..., "meta": {...}}`. Anything else the service sends is
//! ignored; any non-2xx status or unparsable body is a failure.

use crate::config::AppConfig;
use crate::error::{AskError, Result};
use crate::logging;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Request body sent to the answer service
#[derive(Debug, Clone, Serialize)]
pub struct AskRequest {
    pub query: String,
}

/// Successful answer service response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    /// Open-ended metadata; kept but not required to be displayed
    #[serde(default)]
    pub meta: Map<String, Value>,
}

/// Body of the service health probe
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: String,
}

/// Shape of FastAPI-style error bodies; only used to enrich messages
#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

/// HTTP client for the answer service
#[derive(Debug, Clone)]
pub struct AnswerClient {
    http: reqwest::Client,
    endpoint: Url,
    health_url: Url,
    timeout_secs: u64,
}

impl AnswerClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("askpanel/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AskError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.endpoint_url()?,
            health_url: config.health_url()?,
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send one query and decode the answer
    pub async fn ask(&self, query: &str) -> Result<AskResponse> {
        let start = Instant::now();
        tracing::debug!(
            endpoint = %self.endpoint,
            query = %logging::preview(query, logging::QUERY_PREVIEW_CHARS),
            "POST answer service"
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&AskRequest {
                query: query.to_string(),
            })
            .send()
            .await
            .map_err(|e| AskError::from_reqwest(e, self.timeout_secs))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| AskError::from_reqwest(e, self.timeout_secs))?;

        tracing::debug!(
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "answer service responded"
        );

        if !status.is_success() {
            let detail = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .map(|b| b.detail);
            return Err(AskError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }

    /// [`ask`](Self::ask), abandoned as soon as `token` is cancelled.
    ///
    /// Dropping the in-flight request future aborts the underlying transport.
    pub async fn ask_cancellable(
        &self,
        query: &str,
        token: &CancellationToken,
    ) -> Result<AskResponse> {
        tokio::select! {
            biased;

            _ = token.cancelled() => Err(AskError::Cancelled),
            result = self.ask(query) => result,
        }
    }

    /// Probe the service's health endpoint
    pub async fn health(&self) -> Result<HealthStatus> {
        let response = self
            .http
            .get(self.health_url.clone())
            .send()
            .await
            .map_err(|e| AskError::from_reqwest(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AskError::Status {
                status: status.as_u16(),
                detail: None,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AskError::from_reqwest(e, self.timeout_secs))?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, timeout_secs: u64) -> AnswerClient {
        let config = AppConfig {
            endpoint: format!("{}/api/ask", server.uri()),
            timeout_secs,
            ..Default::default()
        };
        AnswerClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn posts_query_and_decodes_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/ask"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"query": "hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "answer": "world",
                "meta": {"cached": false, "request_id": "abc"},
                "ignored": [1, 2, 3]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server, 5).ask("hello").await.unwrap();
        assert_eq!(response.answer, "world");
        assert_eq!(response.meta.get("cached"), Some(&json!(false)));
        assert_eq!(response.meta.get("request_id"), Some(&json!("abc")));
    }

    #[tokio::test]
    async fn missing_meta_is_an_empty_map() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "42"})))
            .mount(&server)
            .await;

        let response = client_for(&server, 5).ask("meaning").await.unwrap();
        assert_eq!(response.answer, "42");
        assert!(response.meta.is_empty());
    }

    #[tokio::test]
    async fn error_status_carries_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({"detail": "An error occurred while processing your request"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server, 5).ask("boom").await.unwrap_err();
        match err {
            AskError::Status { status, detail } => {
                assert_eq!(status, 500);
                assert_eq!(
                    detail.as_deref(),
                    Some("An error occurred while processing your request")
                );
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_status_without_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = client_for(&server, 5).ask("x").await.unwrap_err();
        assert!(matches!(err, AskError::Status { status: 502, detail: None }));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reply": "nope"})))
            .mount(&server)
            .await;

        let err = client_for(&server, 5).ask("x").await.unwrap_err();
        assert!(matches!(err, AskError::Decode(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn slow_service_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"answer": "late", "meta": {}}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let err = client_for(&server, 1).ask("x").await.unwrap_err();
        assert!(matches!(err, AskError::Timeout(1)), "got {err:?}");
    }

    #[tokio::test]
    async fn cancellation_abandons_the_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"answer": "late", "meta": {}}))
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, 30);
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let started = Instant::now();
        let err = client.ask_cancellable("x", &token).await.unwrap_err();
        assert!(err.is_cancellation());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let config = AppConfig {
            // Port 9 (discard) is never an HTTP server
            endpoint: "http://127.0.0.1:9/api/ask".into(),
            timeout_secs: 2,
            ..Default::default()
        };
        let err = AnswerClient::new(&config).unwrap().ask("x").await.unwrap_err();
        assert!(!err.is_cancellation());
        assert!(!err.to_string().is_empty());
    }

    #[tokio::test]
    async fn health_probe_reads_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/healthz/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "timestamp": "2026-10-17T12:00:00"
            })))
            .mount(&server)
            .await;

        let health = client_for(&server, 5).health().await.unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.timestamp, "2026-10-17T12:00:00");
    }
}
