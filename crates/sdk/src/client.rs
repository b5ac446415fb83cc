//! Main client for the Slack SDK.

use crate::api::*;
use crate::config::{ClientConfig, Credentials, RetryConfig, DEFAULT_BASE_URL};
use crate::error::{SlackError, SlackResult};
use crate::transport::HttpTransport;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Client for the Slack Web API. Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct SlackClient {
    config: Arc<ClientConfig>,
    pub(crate) http: HttpTransport,
}

impl SlackClient {
    /// Create a new client builder.
    pub fn builder() -> SlackClientBuilder {
        SlackClientBuilder::new()
    }

    /// Create a client from configuration.
    fn from_config(config: ClientConfig) -> SlackResult<Self> {
        let config = Arc::new(config);
        let http = HttpTransport::new(config.clone())?;

        Ok(Self { config, http })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the auth API.
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    /// Get the conversations API.
    pub fn conversations(&self) -> ConversationsApi<'_> {
        ConversationsApi::new(self)
    }
}

/// Builder for creating a SlackClient.
#[derive(Clone)]
pub struct SlackClientBuilder {
    base_url: String,
    credentials: Option<Credentials>,
    timeout: Duration,
    retry_config: RetryConfig,
}

impl SlackClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials: None,
            timeout: Duration::from_secs(30),
            retry_config: RetryConfig::default(),
        }
    }

    /// Override the Web API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Authenticate with a bot or user token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::Token(token.into()));
        self
    }

    /// Authenticate with a browser-session token and its `d` cookie.
    pub fn browser_session(mut self, token: impl Into<String>, cookie: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::BrowserSession {
            token: token.into(),
            cookie: cookie.into(),
        });
        self
    }

    /// Set credentials directly.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry configuration.
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Build the client.
    pub fn build(self) -> SlackResult<SlackClient> {
        let credentials = self
            .credentials
            .ok_or_else(|| SlackError::Config("Slack credentials are required".to_string()))?;

        // `Url::join` drops the last path segment unless the base ends in '/'
        let mut base_url = self.base_url;
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base_url = Url::parse(&base_url)?;

        let config = ClientConfig {
            base_url,
            credentials,
            timeout: self.timeout,
            retry_config: self.retry_config,
        };

        SlackClient::from_config(config)
    }
}

impl Default for SlackClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
