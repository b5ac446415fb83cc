// MCP request handling shared by the stdio and HTTP transports

use crate::protocol::*;
use crate::tools::ToolRegistry;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

const INSTRUCTIONS: &str = "Read-only access to a Slack workspace. Use channels_list to \
enumerate conversations; the result is CSV with columns id, name, topic, purpose and memberCount.";

pub struct McpServer {
    registry: ToolRegistry,
    server_info: ServerInfo,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry,
            server_info: ServerInfo {
                name: "slack-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    /// Handle one raw JSON-RPC message.
    ///
    /// Malformed JSON yields a parse error with a null id; well-formed JSON
    /// that is not a request yields an invalid-request error.
    pub async fn handle_message(&self, raw: &str, cancel: CancellationToken) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse JSON-RPC message");
                return Some(JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error()));
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle_request(request, cancel).await,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid JSON-RPC request");
                Some(JsonRpcResponse::error(id, JsonRpcError::invalid_request()))
            }
        }
    }

    /// Handle a parsed request. Returns `None` for notifications.
    pub async fn handle_request(
        &self,
        request: JsonRpcRequest,
        cancel: CancellationToken,
    ) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            self.handle_notification(&request);
            return None;
        };

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(id, JsonRpcError::invalid_request()));
        }

        tracing::debug!(method = %request.method, id = %id, "Handling request");

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params, cancel).await,
            other => JsonRpcResponse::error(id, JsonRpcError::method_not_found(other)),
        };
        Some(response)
    }

    fn handle_notification(&self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "notifications/initialized" => tracing::info!("Client initialized"),
            "notifications/cancelled" => {
                tracing::debug!(params = ?request.params, "Client cancelled a request")
            }
            other => tracing::debug!(method = other, "Ignoring notification"),
        }
    }

    fn handle_initialize(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params: InitializeParams = params
            .and_then(|p| serde_json::from_value(p).ok())
            .unwrap_or_default();

        if let Some(client) = &params.client_info {
            tracing::info!(
                client = %client.name,
                client_version = %client.version,
                protocol_version = ?params.protocol_version,
                "Client connected"
            );
        }

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
            },
            server_info: self.server_info.clone(),
            instructions: Some(INSTRUCTIONS.to_string()),
        };
        JsonRpcResponse::from_result(id, &result)
    }

    fn handle_tools_list(&self, id: Value) -> JsonRpcResponse {
        let result = ListToolsResult {
            tools: self.registry.list_schemas(),
        };
        JsonRpcResponse::from_result(id, &result)
    }

    async fn handle_tools_call(
        &self,
        id: Value,
        params: Option<Value>,
        cancel: CancellationToken,
    ) -> JsonRpcResponse {
        let params: CallToolParams = match params.map(serde_json::from_value::<CallToolParams>) {
            Some(Ok(params)) => params,
            Some(Err(e)) => {
                return JsonRpcResponse::error(id, JsonRpcError::invalid_params(e.to_string()))
            }
            None => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params("Missing params for tools/call"),
                )
            }
        };

        match self.registry.invoke(&params.name, params.arguments, cancel).await {
            Ok(result) => JsonRpcResponse::from_result(id, &result),
            Err(e) => {
                tracing::error!(tool = %params.name, kind = e.kind(), error = %e, "Tool call failed");
                JsonRpcResponse::error(id, e.to_rpc_error())
            }
        }
    }
}
