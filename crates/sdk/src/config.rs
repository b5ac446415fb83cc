//! Configuration types for the Slack SDK.

use std::time::Duration;
use url::Url;

/// Default Slack Web API root.
pub const DEFAULT_BASE_URL: &str = "https://slack.com/api/";

/// Credentials used to authenticate against Slack.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Bot or user token (`xoxb-`, `xoxp-`), sent as a bearer token.
    Token(String),
    /// Browser-session token (`xoxc-`) plus its `d` cookie (`xoxd-`).
    BrowserSession { token: String, cookie: String },
}

impl Credentials {
    pub fn token(&self) -> &str {
        match self {
            Credentials::Token(token) => token,
            Credentials::BrowserSession { token, .. } => token,
        }
    }

    pub fn cookie(&self) -> Option<&str> {
        match self {
            Credentials::Token(_) => None,
            Credentials::BrowserSession { cookie, .. } => Some(cookie),
        }
    }
}

// Secrets never reach logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Token(_) => f.write_str("Credentials::Token(<redacted>)"),
            Credentials::BrowserSession { .. } => {
                f.write_str("Credentials::BrowserSession(<redacted>)")
            }
        }
    }
}

/// Configuration for the Slack client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Web API, ending in `/`.
    pub base_url: Url,
    /// Credentials for every request.
    pub credentials: Credentials,
    /// Request timeout.
    pub timeout: Duration,
    /// Retry configuration.
    pub retry_config: RetryConfig,
}

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries.
    pub max_retries: u32,
    /// Initial backoff duration.
    pub initial_backoff: Duration,
    /// Maximum backoff duration, also the cap on honored `Retry-After`.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub backoff_multiplier: f64,
    /// HTTP status codes to retry on.
    pub retry_on_status_codes: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            retry_on_status_codes: vec![429, 500, 502, 503, 504],
        }
    }
}

impl RetryConfig {
    /// Create a configuration with no retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Calculate backoff duration for a given attempt.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let backoff_ms = self.initial_backoff.as_millis() as f64
            * self.backoff_multiplier.powi(attempt as i32);
        let backoff = Duration::from_millis(backoff_ms as u64);
        std::cmp::min(backoff, self.max_backoff)
    }

    /// Delay before the next attempt, preferring Slack's `Retry-After`.
    pub fn delay_for_attempt(&self, attempt: u32, retry_after_secs: Option<u64>) -> Duration {
        match retry_after_secs {
            Some(secs) => std::cmp::min(Duration::from_secs(secs), self.max_backoff),
            None => self.backoff_for_attempt(attempt),
        }
    }

    /// Check if a status code should trigger a retry.
    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_on_status_codes.contains(&status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        let config = RetryConfig::default();

        assert_eq!(config.backoff_for_attempt(0), Duration::from_millis(250));
        assert_eq!(config.backoff_for_attempt(1), Duration::from_millis(500));
        assert_eq!(config.backoff_for_attempt(2), Duration::from_millis(1000));
    }

    #[test]
    fn test_backoff_capped_at_max() {
        let config = RetryConfig {
            max_backoff: Duration::from_millis(500),
            ..Default::default()
        };

        assert_eq!(config.backoff_for_attempt(10), Duration::from_millis(500));
    }

    #[test]
    fn test_retry_after_preferred_and_capped() {
        let config = RetryConfig::default();

        assert_eq!(config.delay_for_attempt(0, Some(3)), Duration::from_secs(3));
        assert_eq!(config.delay_for_attempt(0, Some(600)), Duration::from_secs(30));
        assert_eq!(config.delay_for_attempt(1, None), Duration::from_millis(500));
    }

    #[test]
    fn test_should_retry_status() {
        let config = RetryConfig::default();

        assert!(config.should_retry_status(429));
        assert!(config.should_retry_status(503));
        assert!(!config.should_retry_status(400));
        assert!(!config.should_retry_status(401));
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let creds = Credentials::BrowserSession {
            token: "xoxc-secret".to_string(),
            cookie: "xoxd-secret".to_string(),
        };
        let printed = format!("{creds:?}");
        assert!(!printed.contains("secret"));
        assert_eq!(creds.token(), "xoxc-secret");
        assert_eq!(creds.cookie(), Some("xoxd-secret"));
    }
}
