//! Error taxonomy for the tool-invocation bridge.

use thiserror::Error;

/// Boxed error used to carry upstream causes across crate boundaries
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors raised between session resolution and encoding
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Credentials are missing or were rejected by Slack
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Bootstrap did not finish within the allowed wait
    #[error("Slack session is not ready yet (bootstrap still running after {waited_secs}s)")]
    NotReady { waited_secs: u64 },

    /// A call to the listing endpoint failed; the whole fetch is aborted
    #[error("Upstream request failed on page {page}")]
    Upstream {
        page: u32,
        #[source]
        source: BoxError,
    },

    /// Pagination did not terminate within the page cap
    #[error("Pagination did not finish after {max_pages} pages")]
    PaginationExhausted { max_pages: u32 },

    /// Rows could not be serialized
    #[error("Failed to encode result")]
    Encoding(#[source] BoxError),

    /// The caller cancelled the call or it timed out
    #[error("Request was cancelled")]
    Cancelled,
}

impl BridgeError {
    /// Short stable name, used in protocol error payloads and logs
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeError::Authentication(_) => "authentication",
            BridgeError::NotReady { .. } => "not_ready",
            BridgeError::Upstream { .. } => "upstream",
            BridgeError::PaginationExhausted { .. } => "pagination_exhausted",
            BridgeError::Encoding(_) => "encoding",
            BridgeError::Cancelled => "cancelled",
        }
    }

    /// Messages of this error and every underlying source, outermost first
    pub fn causes(&self) -> Vec<String> {
        let mut causes = vec![self.to_string()];
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            causes.push(err.to_string());
            source = err.source();
        }
        causes
    }
}
