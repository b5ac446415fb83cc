//! Conversations API methods.

use crate::client::SlackClient;
use crate::error::SlackResult;
use serde::{Deserialize, Serialize};
use slack_mcp_core::types::{ChannelType, Conversation, ConversationsPage, ListConversationsRequest};

/// Conversations API for listing channels and DMs.
pub struct ConversationsApi<'a> {
    client: &'a SlackClient,
}

impl<'a> ConversationsApi<'a> {
    pub(crate) fn new(client: &'a SlackClient) -> Self {
        Self { client }
    }

    /// Fetch one page of `conversations.list`.
    pub async fn list(&self, request: &ListConversationsRequest) -> SlackResult<ConversationsPage> {
        let mut query = vec![
            ("types", ChannelType::join(&request.types)),
            ("limit", request.limit.to_string()),
            ("exclude_archived", request.exclude_archived.to_string()),
        ];
        if !request.cursor.is_empty() {
            query.push(("cursor", request.cursor.clone()));
        }

        let response: ListConversationsResponse = self
            .client
            .http
            .get("conversations.list", &query)
            .await?;

        Ok(ConversationsPage {
            channels: response.channels,
            next_cursor: response
                .response_metadata
                .map(|m| m.next_cursor)
                .unwrap_or_default(),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ListConversationsResponse {
    #[serde(default)]
    channels: Vec<Conversation>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

#[cfg(test)]
mod tests {
    use crate::client::SlackClient;
    use crate::config::RetryConfig;
    use crate::error::SlackError;
    use serde_json::json;
    use slack_mcp_core::types::{ChannelType, ListConversationsRequest};
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> SlackClient {
        SlackClient::builder()
            .base_url(format!("{}/api/", server.uri()))
            .token("xoxb-test")
            .retry_config(RetryConfig::no_retry())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_first_page_request_shape() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/conversations.list"))
            .and(query_param("types", "public_channel,im"))
            .and(query_param("limit", "100"))
            .and(query_param("exclude_archived", "true"))
            .and(query_param_is_missing("cursor"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "channels": [
                    {
                        "id": "C012AB3CD",
                        "name": "general",
                        "is_channel": true,
                        "is_private": false,
                        "topic": {"value": "Company-wide", "creator": "U1", "last_set": 0},
                        "purpose": {"value": "Everything", "creator": "U1", "last_set": 0},
                        "num_members": 4
                    },
                    {"id": "D0C0F7S8Y", "is_im": true, "user": "U0BS9U4SV"}
                ],
                "response_metadata": {"next_cursor": "dGVhbTpDMDYxRkE1UEI="}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = ListConversationsRequest::new(vec![ChannelType::PublicChannel, ChannelType::Im]);
        let page = client(&server).conversations().list(&request).await.unwrap();

        assert_eq!(page.channels.len(), 2);
        assert_eq!(page.channels[0].name.as_deref(), Some("general"));
        assert_eq!(page.channels[0].num_members, Some(4));
        assert_eq!(page.channels[0].topic.as_ref().unwrap().value, "Company-wide");
        assert_eq!(page.channels[1].kind(), ChannelType::Im);
        assert_eq!(page.next_cursor, "dGVhbTpDMDYxRkE1UEI=");
    }

    #[tokio::test]
    async fn test_cursor_is_forwarded_and_missing_metadata_ends_listing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/conversations.list"))
            .and(query_param("cursor", "abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "channels": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut request = ListConversationsRequest::new(ChannelType::defaults());
        request.cursor = "abc".to_string();
        let page = client(&server).conversations().list(&request).await.unwrap();

        assert!(page.channels.is_empty());
        assert!(page.next_cursor.is_empty());
    }

    #[tokio::test]
    async fn test_slack_error_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/conversations.list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": false,
                "error": "missing_scope"
            })))
            .mount(&server)
            .await;

        let request = ListConversationsRequest::new(ChannelType::defaults());
        let err = client(&server).conversations().list(&request).await.unwrap_err();

        match err {
            SlackError::Api { method, error } => {
                assert_eq!(method, "conversations.list");
                assert_eq!(error, "missing_scope");
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }
}
