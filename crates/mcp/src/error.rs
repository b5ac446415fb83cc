//! Errors surfaced by the tool dispatcher and protocol handler.

use crate::protocol::JsonRpcError;
use serde_json::json;
use slack_mcp_core::BridgeError;
use thiserror::Error;

pub type McpResult<T> = Result<T, McpError>;

#[derive(Error, Debug)]
pub enum McpError {
    /// Tool arguments failed validation before any downstream call
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl McpError {
    /// JSON-RPC error code for this failure
    pub fn error_code(&self) -> i32 {
        match self {
            McpError::InvalidArguments(_) => -32602,
            McpError::UnknownTool(_) => -32601,
            McpError::Bridge(err) => match err {
                BridgeError::Authentication(_) => -32001,
                BridgeError::NotReady { .. } => -32002,
                BridgeError::Upstream { .. } => -32003,
                BridgeError::PaginationExhausted { .. } => -32004,
                BridgeError::Encoding(_) => -32005,
                BridgeError::Cancelled => -32800,
            },
            McpError::Serialization(_) | McpError::Io(_) => -32603,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            McpError::InvalidArguments(_) => "invalid_arguments",
            McpError::UnknownTool(_) => "unknown_tool",
            McpError::Bridge(err) => err.kind(),
            McpError::Serialization(_) => "serialization",
            McpError::Io(_) => "io",
        }
    }

    /// Convert to a JSON-RPC error that keeps the full cause chain in `data`
    pub fn to_rpc_error(&self) -> JsonRpcError {
        let causes = match self {
            McpError::Bridge(err) => err.causes(),
            other => vec![other.to_string()],
        };
        JsonRpcError::custom(self.error_code(), self.to_string())
            .with_data(json!({ "kind": self.kind(), "causes": causes }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_error_codes() {
        let cases = [
            (BridgeError::Authentication("invalid_auth".into()), -32001),
            (BridgeError::NotReady { waited_secs: 30 }, -32002),
            (
                BridgeError::Upstream {
                    page: 1,
                    source: "boom".into(),
                },
                -32003,
            ),
            (BridgeError::PaginationExhausted { max_pages: 5 }, -32004),
            (BridgeError::Encoding("bad".into()), -32005),
            (BridgeError::Cancelled, -32800),
        ];
        for (err, code) in cases {
            assert_eq!(McpError::from(err).error_code(), code);
        }
    }

    #[test]
    fn test_rpc_error_carries_causes() {
        let err = McpError::from(BridgeError::Upstream {
            page: 3,
            source: "Slack API error in conversations.list: ratelimited".into(),
        });
        let rpc = err.to_rpc_error();

        assert_eq!(rpc.code, -32003);
        assert_eq!(rpc.message, "Upstream request failed on page 3");
        let data = rpc.data.unwrap();
        assert_eq!(data["kind"], "upstream");
        assert_eq!(
            data["causes"][1],
            "Slack API error in conversations.list: ratelimited"
        );
    }

    #[test]
    fn test_argument_errors() {
        let rpc = McpError::InvalidArguments("unknown channel type: group".into()).to_rpc_error();
        assert_eq!(rpc.code, -32602);
        assert_eq!(rpc.data.unwrap()["kind"], "invalid_arguments");
        assert_eq!(McpError::UnknownTool("x".into()).error_code(), -32601);
    }
}
