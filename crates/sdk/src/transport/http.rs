//! HTTP transport layer for the Slack SDK.

use crate::config::ClientConfig;
use crate::error::{SlackError, SlackResult};
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// HTTP transport for making Web API calls.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: Arc<ClientConfig>,
}

/// The `ok`/`error` pair every Web API response carries.
#[derive(Debug, Deserialize)]
struct ApiStatus {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given configuration.
    pub fn new(config: Arc<ClientConfig>) -> SlackResult<Self> {
        let mut headers = header::HeaderMap::new();

        let token = config.credentials.token();
        if token.trim().is_empty() {
            return Err(SlackError::Config("Slack token is empty".to_string()));
        }
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| SlackError::Config("Invalid token format".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);

        if let Some(cookie) = config.credentials.cookie() {
            if cookie.trim().is_empty() {
                return Err(SlackError::Config("Slack session cookie is empty".to_string()));
            }
            let mut value = header::HeaderValue::from_str(&format!("d={}", cookie))
                .map_err(|_| SlackError::Config("Invalid session cookie format".to_string()))?;
            value.set_sensitive(true);
            headers.insert(header::COOKIE, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("slack-mcp/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// Build a URL for the given Web API method.
    fn build_url(&self, api_method: &str) -> SlackResult<url::Url> {
        self.config
            .base_url
            .join(api_method)
            .map_err(SlackError::InvalidUrl)
    }

    /// Send one attempt and decode its body.
    async fn send_once<T: DeserializeOwned>(
        &self,
        api_method: &str,
        request_builder: &RequestBuilder,
    ) -> SlackResult<T> {
        let request = request_builder
            .try_clone()
            .ok_or_else(|| SlackError::Config("Request cannot be cloned".to_string()))?;

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(SlackError::RateLimited {
                    retry_after_secs: retry_after_secs(&response),
                });
            }
            let body = response.text().await.unwrap_or_default();
            return Err(SlackError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        parse_response(api_method, &body)
    }

    /// Execute a call, retrying transient failures.
    async fn call<T: DeserializeOwned>(
        &self,
        api_method: &str,
        request_builder: RequestBuilder,
    ) -> SlackResult<T> {
        let retry_config = &self.config.retry_config;
        let mut attempts = 0;

        loop {
            match self.send_once(api_method, &request_builder).await {
                Ok(value) => return Ok(value),
                Err(err) if attempts < retry_config.max_retries && self.should_retry(&err) => {
                    let retry_after = match &err {
                        SlackError::RateLimited { retry_after_secs } => *retry_after_secs,
                        _ => None,
                    };
                    let delay = retry_config.delay_for_attempt(attempts, retry_after);
                    warn!(
                        method = api_method,
                        attempt = attempts + 1,
                        delay_ms = delay.as_millis(),
                        error = %err,
                        "Slack request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempts += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// HTTP statuses follow the configured list; everything else defers to
    /// the error's own classification.
    fn should_retry(&self, err: &SlackError) -> bool {
        let retry_config = &self.config.retry_config;
        match err {
            SlackError::Status { status, .. } => retry_config.should_retry_status(*status),
            SlackError::RateLimited { .. } => {
                retry_config.should_retry_status(StatusCode::TOO_MANY_REQUESTS.as_u16())
            }
            other => other.is_retryable(),
        }
    }

    /// Call a Web API method with GET and query parameters.
    pub async fn get<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        api_method: &str,
        query: &Q,
    ) -> SlackResult<T> {
        let url = self.build_url(api_method)?;
        debug!(url = %url, "GET request");

        self.call(api_method, self.client.get(url).query(query)).await
    }

    /// Call a Web API method with a form-encoded POST body.
    pub async fn post_form<T: DeserializeOwned, F: Serialize + ?Sized>(
        &self,
        api_method: &str,
        form: &F,
    ) -> SlackResult<T> {
        let url = self.build_url(api_method)?;
        debug!(url = %url, "POST request");

        self.call(api_method, self.client.post(url).form(form)).await
    }
}

fn retry_after_secs(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Check the `ok` flag, then decode the method-specific body.
fn parse_response<T: DeserializeOwned>(api_method: &str, body: &str) -> SlackResult<T> {
    let status: ApiStatus = serde_json::from_str(body)?;
    if !status.ok {
        return Err(SlackError::Api {
            method: api_method.to_string(),
            error: status.error.unwrap_or_else(|| "unknown_error".to_string()),
        });
    }
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Credentials, RetryConfig};
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestResponse {
        value: i32,
    }

    fn create_config(base_url: &str, credentials: Credentials) -> Arc<ClientConfig> {
        Arc::new(ClientConfig {
            base_url: url::Url::parse(&format!("{}/api/", base_url)).unwrap(),
            credentials,
            timeout: Duration::from_secs(5),
            retry_config: RetryConfig::no_retry(),
        })
    }

    fn token() -> Credentials {
        Credentials::Token("xoxp-test".to_string())
    }

    #[tokio::test]
    async fn test_get_with_query_and_bearer() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/test.method"))
            .and(query_param("limit", "100"))
            .and(header("Authorization", "Bearer xoxp-test"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true, "value": 42})),
            )
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&server.uri(), token())).unwrap();

        let result: TestResponse = transport
            .get("test.method", &[("limit", "100")])
            .await
            .unwrap();
        assert_eq!(result, TestResponse { value: 42 });
    }

    #[tokio::test]
    async fn test_browser_session_sends_cookie() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/test.method"))
            .and(header("Authorization", "Bearer xoxc-abc"))
            .and(header("Cookie", "d=xoxd-def"))
            .and(body_string_contains("a=b"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true, "value": 1})),
            )
            .mount(&server)
            .await;

        let credentials = Credentials::BrowserSession {
            token: "xoxc-abc".to_string(),
            cookie: "xoxd-def".to_string(),
        };
        let transport = HttpTransport::new(create_config(&server.uri(), credentials)).unwrap();

        let result: TestResponse = transport
            .post_form("test.method", &[("a", "b")])
            .await
            .unwrap();
        assert_eq!(result.value, 1);
    }

    #[tokio::test]
    async fn test_ok_false_is_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/test.method"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"ok": false, "error": "invalid_auth"})),
            )
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&server.uri(), token())).unwrap();

        let result: SlackResult<TestResponse> = transport.get("test.method", &[("x", "y")]).await;
        match result {
            Err(err @ SlackError::Api { .. }) => {
                assert!(err.is_auth_error());
                assert_eq!(err.to_string(), "Slack API error in test.method: invalid_auth");
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/test.method"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&server.uri(), token())).unwrap();

        let result: SlackResult<TestResponse> = transport.get("test.method", &[("x", "y")]).await;
        match result {
            Err(SlackError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("Expected Status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/test.method"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/test.method"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true, "value": 7})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let config = Arc::new(ClientConfig {
            retry_config: RetryConfig {
                max_retries: 2,
                ..Default::default()
            },
            ..(*create_config(&server.uri(), token())).clone()
        });
        let transport = HttpTransport::new(config).unwrap();

        let result: TestResponse = transport.get("test.method", &[("x", "y")]).await.unwrap();
        assert_eq!(result.value, 7);
    }

    fn retrying_config(server: &MockServer) -> Arc<ClientConfig> {
        Arc::new(ClientConfig {
            base_url: url::Url::parse(&format!("{}/api/", server.uri())).unwrap(),
            credentials: token(),
            timeout: Duration::from_secs(5),
            retry_config: RetryConfig {
                max_retries: 2,
                initial_backoff: Duration::from_millis(1),
                ..Default::default()
            },
        })
    }

    #[tokio::test]
    async fn test_transient_slack_error_is_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/test.method"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"ok": false, "error": "ratelimited"})),
            )
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/test.method"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true, "value": 3})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(retrying_config(&server)).unwrap();

        let result: TestResponse = transport.get("test.method", &[("x", "y")]).await.unwrap();
        assert_eq!(result.value, 3);
    }

    #[tokio::test]
    async fn test_permanent_slack_error_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/test.method"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"ok": false, "error": "invalid_auth"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(retrying_config(&server)).unwrap();

        let result: SlackResult<TestResponse> = transport.get("test.method", &[("x", "y")]).await;
        assert!(matches!(result, Err(SlackError::Api { .. })));
    }

    #[tokio::test]
    async fn test_rate_limit_without_retries() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/test.method"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "12"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&server.uri(), token())).unwrap();

        let result: SlackResult<TestResponse> = transport.get("test.method", &[("x", "y")]).await;
        assert!(matches!(
            result,
            Err(SlackError::RateLimited {
                retry_after_secs: Some(12)
            })
        ));
    }

    #[test]
    fn test_empty_token_rejected() {
        let result = HttpTransport::new(create_config("http://localhost:1", Credentials::Token(" ".to_string())));
        assert!(matches!(result, Err(SlackError::Config(_))));
    }

    #[test]
    fn test_build_url() {
        let transport = HttpTransport::new(create_config("http://localhost:8080", token())).unwrap();

        let url = transport.build_url("conversations.list").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/conversations.list");
    }
}
