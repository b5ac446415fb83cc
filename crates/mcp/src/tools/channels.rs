// Channel listing tool

use crate::error::{McpError, McpResult};
use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{json_schema_array, json_schema_object, Tool};
use serde::Deserialize;
use slack_mcp_core::{ChannelType, ChannelsQuery, ChannelsService, SortPolicy};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const CHANNELS_LIST: &str = "channels_list";

/// Lists workspace conversations as CSV
pub struct ChannelsListTool {
    service: Arc<ChannelsService>,
    timeout: Duration,
}

impl ChannelsListTool {
    pub fn new(service: Arc<ChannelsService>) -> Self {
        Self {
            service,
            timeout: Duration::from_secs(120),
        }
    }

    /// Upper bound on a single call, after which it is cancelled
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Default, Deserialize)]
struct ChannelsListArgs {
    #[serde(default)]
    sort: Option<String>,
    #[serde(default)]
    channel_types: Option<ChannelTypesArg>,
}

/// Accepts either `["im", "mpim"]` or `"im,mpim"`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChannelTypesArg {
    List(Vec<String>),
    Csv(String),
}

impl ChannelTypesArg {
    fn names(&self) -> Vec<&str> {
        match self {
            ChannelTypesArg::List(names) => names.iter().map(String::as_str).collect(),
            ChannelTypesArg::Csv(csv) => csv.split(',').collect(),
        }
    }
}

/// Resolve raw tool arguments into a query, applying defaults
fn resolve_query(arguments: serde_json::Value) -> McpResult<ChannelsQuery> {
    let args: ChannelsListArgs = match arguments {
        serde_json::Value::Null => ChannelsListArgs::default(),
        value => serde_json::from_value(value)
            .map_err(|e| McpError::InvalidArguments(e.to_string()))?,
    };

    let sort = args
        .sort
        .as_deref()
        .map(SortPolicy::parse)
        .unwrap_or_default();

    let mut types: Vec<ChannelType> = Vec::new();
    if let Some(arg) = &args.channel_types {
        for name in arg.names() {
            if name.trim().is_empty() {
                continue;
            }
            let kind: ChannelType = name
                .parse()
                .map_err(|e: slack_mcp_core::types::UnknownChannelType| {
                    McpError::InvalidArguments(e.to_string())
                })?;
            if !types.contains(&kind) {
                types.push(kind);
            }
        }
    }
    if types.is_empty() {
        types = ChannelType::defaults();
    }

    Ok(ChannelsQuery { types, sort })
}

#[async_trait::async_trait]
impl Tool for ChannelsListTool {
    fn schema(&self) -> ToolSchema {
        let type_names: Vec<&str> = ChannelType::ALL.iter().map(|t| t.as_str()).collect();

        ToolSchema {
            name: CHANNELS_LIST.to_string(),
            description: "Get list of channels as CSV with columns id, name, topic, purpose and memberCount".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "sort": {
                        "type": "string",
                        "description": "Sort order. 'popularity' sorts by member count, most members first. Any other value keeps Slack's order.",
                        "default": "popularity"
                    },
                    "channel_types": json_schema_array(
                        serde_json::json!({ "type": "string", "enum": type_names }),
                        "Conversation types to include. Defaults to public_channel."
                    )
                }),
                vec![],
            ),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        cancel: CancellationToken,
    ) -> McpResult<CallToolResult> {
        let query = resolve_query(arguments)?;
        tracing::info!(
            types = %ChannelType::join(&query.types),
            sort = ?query.sort,
            "Listing channels"
        );

        let call = self.service.list(&query, &cancel);
        tokio::pin!(call);

        let csv = tokio::select! {
            result = &mut call => result?,
            _ = tokio::time::sleep(self.timeout) => {
                tracing::warn!(timeout_secs = self.timeout.as_secs(), "Channel listing timed out, cancelling");
                cancel.cancel();
                call.await?
            }
        };

        Ok(CallToolResult::text(csv))
    }
}
