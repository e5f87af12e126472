use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use super::error::ApiError;
use super::types::{GenerateOptions, SubmitReceipt};
use crate::generation::{FetchOutcome, JobHandle, StatusFetch};

/// HTTP client for the JobBuddy cover-letter endpoints.
///
/// The bearer token is injected at construction rather than read from any
/// process-wide storage, so the polling core can be exercised against a fake
/// or a local mock server.
pub struct JobBuddyClient {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl JobBuddyClient {
    pub fn new(base_url: String, api_token: Option<String>) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
        }
    }

    fn resource_url(&self, job: &JobHandle) -> String {
        format!("{}/api/cover-letters/{}", self.base_url, job.job_id)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Ask the backend to start AI generation for a saved draft.
    ///
    /// `POST /api/cover-letters/{id}/generate`, with `mode` and
    /// `exportFormat` as query parameters when present. Returns the receipt
    /// from the `{code, message, data}` envelope or an [`ApiError`].
    pub async fn submit_generation(
        &self,
        job: &JobHandle,
        options: &GenerateOptions,
    ) -> Result<SubmitReceipt, ApiError> {
        let mut request = self
            .client
            .post(format!("{}/generate", self.resource_url(job)));
        if let Some(mode) = &options.mode {
            request = request.query(&[("mode", mode.as_str())]);
        }
        if let Some(format) = &options.export_format {
            request = request.query(&[("exportFormat", format.as_str())]);
        }

        let response = self.authorize(request).json(&options.body).send().await?;
        let status = response.status();
        let json = response.json::<Value>().await.unwrap_or(Value::Null);

        if !status.is_success() {
            let message = json
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("generation request failed")
                .to_string();
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
            });
        }

        if !json.get("code").is_some_and(is_success_code) || json.get("data").is_none() {
            let message = json
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unexpected response envelope")
                .to_string();
            return Err(ApiError::Envelope(message));
        }

        let initial_status = json
            .get("data")
            .and_then(|data| data.get("status"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(SubmitReceipt {
            accepted: true,
            initial_status,
        })
    }
}

impl StatusFetch for JobBuddyClient {
    /// `GET /api/cover-letters/{id}`. Never fails: transport problems become
    /// `TransportFailure` and everything else is handed to the classifier as
    /// an HTTP response.
    async fn fetch_status(&self, job: &JobHandle) -> FetchOutcome {
        let request = self.authorize(self.client.get(self.resource_url(job)));
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                return FetchOutcome::TransportFailure {
                    message: err.to_string(),
                };
            }
        };

        let status = response.status().as_u16();
        let body = response.json::<Value>().await.ok().map(unwrap_envelope);
        FetchOutcome::Response { status, body }
    }
}

// The backend treats both 200 and "SU" as its success code.
fn is_success_code(code: &Value) -> bool {
    code.as_i64() == Some(200) || code.as_str() == Some("SU")
}

/// Success payloads arrive wrapped as `{code, message, data}`. Surface the
/// inner data object so the classifier sees the payload's own `status` field;
/// error bodies pass through unchanged so their `message` survives.
fn unwrap_envelope(mut json: Value) -> Value {
    let enveloped = json.get("code").is_some_and(is_success_code)
        && matches!(json.get("data"), Some(Value::Object(_)));
    if enveloped {
        json.get_mut("data").map(Value::take).unwrap_or(Value::Null)
    } else {
        json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{
        ErrorKind, GenerationSession, PollOutcome, PollerOptions, SessionState, classify,
    };
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> JobBuddyClient {
        JobBuddyClient::new(server.uri(), None)
    }

    #[tokio::test]
    async fn fetch_status_unwraps_success_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cover-letters/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 200,
                "message": "ok",
                "data": {"status": "PROCESSING"},
            })))
            .mount(&server)
            .await;

        let outcome = client_for(&server)
            .fetch_status(&JobHandle::new("7"))
            .await;

        match &outcome {
            FetchOutcome::Response { status, body } => {
                assert_eq!(*status, 200);
                assert_eq!(body.as_ref().unwrap()["status"], "PROCESSING");
            }
            other => panic!("expected response, got {other:?}"),
        }
        assert_eq!(classify(&outcome), PollOutcome::StillProcessing);
    }

    #[tokio::test]
    async fn string_success_code_is_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cover-letters/8"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": "SU",
                "message": "ok",
                "data": {"status": "SUCCESS", "content": "본문"},
            })))
            .mount(&server)
            .await;

        let outcome = client_for(&server)
            .fetch_status(&JobHandle::new("8"))
            .await;

        assert!(matches!(
            classify(&outcome),
            PollOutcome::Succeeded { .. }
        ));
    }

    #[tokio::test]
    async fn error_bodies_keep_their_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cover-letters/9"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({"message": "generation backend down"})),
            )
            .mount(&server)
            .await;

        let outcome = client_for(&server)
            .fetch_status(&JobHandle::new("9"))
            .await;

        assert_eq!(
            classify(&outcome),
            PollOutcome::Fatal {
                kind: ErrorKind::ServerError,
                message: "generation backend down".into(),
            }
        );
    }

    #[tokio::test]
    async fn bearer_token_is_attached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cover-letters/10"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 200,
                "data": {"status": "PROCESSING"},
            })))
            .mount(&server)
            .await;

        let client = JobBuddyClient::new(server.uri(), Some("test-token".into()));
        let outcome = client.fetch_status(&JobHandle::new("10")).await;

        // Without the header the mock would not match and the server would
        // answer 404 instead.
        assert!(matches!(
            outcome,
            FetchOutcome::Response { status: 200, .. }
        ));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_failure() {
        let client = JobBuddyClient::new("http://127.0.0.1:9".into(), None);
        let outcome = client.fetch_status(&JobHandle::new("1")).await;
        assert!(matches!(outcome, FetchOutcome::TransportFailure { .. }));
    }

    #[tokio::test]
    async fn submit_generation_returns_receipt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/cover-letters/7/generate"))
            .and(query_param("mode", "poll"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": "SU",
                "message": "ok",
                "data": {"coverLetterId": 7, "status": "PROCESSING"},
            })))
            .mount(&server)
            .await;

        let options = GenerateOptions {
            mode: Some("poll".into()),
            ..Default::default()
        };
        let receipt = client_for(&server)
            .submit_generation(&JobHandle::new("7"), &options)
            .await
            .unwrap();

        assert!(receipt.accepted);
        assert_eq!(receipt.initial_status.as_deref(), Some("PROCESSING"));
    }

    #[tokio::test]
    async fn submit_generation_surfaces_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/cover-letters/7/generate"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "로그인이 필요합니다."})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .submit_generation(&JobHandle::new("7"), &GenerateOptions::default())
            .await
            .unwrap_err();

        match err {
            ApiError::Http { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "로그인이 필요합니다.");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn submit_generation_rejects_bad_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/cover-letters/7/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"code": 500, "message": "내부 오류"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .submit_generation(&JobHandle::new("7"), &GenerateOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Envelope(message) if message == "내부 오류"));
    }

    #[tokio::test]
    async fn session_polls_through_conflicts_to_success() {
        let server = MockServer::start().await;
        // The first two probes hit before the job materializes.
        Mock::given(method("GET"))
            .and(path("/api/cover-letters/42"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_json(json!({"message": "아직 생성되지 않았습니다."})),
            )
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/cover-letters/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 200,
                "message": "ok",
                "data": {
                    "status": "SUCCESS",
                    "title": "자소서",
                    "sections": [{"question": "지원 동기", "answer": "..."}],
                },
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut session = GenerationSession::new(
            JobHandle::new("42"),
            PollerOptions {
                interval_ms: 1,
                max_attempts: None,
            },
        );

        session.run(&client).await;

        assert_eq!(session.attempts(), 3);
        match session.state() {
            SessionState::Succeeded { document } => {
                assert!(document.flat_text.starts_with("Q1. 지원 동기\n"));
            }
            other => panic!("expected Succeeded, got {other:?}"),
        }
    }
}
