//! Plugs the Slack client into the bridge's session and listing interfaces.

use crate::client::{SlackClient, SlackClientBuilder};
use crate::error::SlackError;
use slack_mcp_core::error::{BoxError, BridgeError, BridgeResult};
use slack_mcp_core::session::{Authenticator, Session, SessionIdentity, SessionMode};
use slack_mcp_core::types::{ConversationsPage, ListConversationsRequest};
use std::sync::Arc;

#[async_trait::async_trait]
impl slack_mcp_core::types::ConversationsApi for SlackClient {
    async fn list_conversations(
        &self,
        request: &ListConversationsRequest,
    ) -> Result<ConversationsPage, BoxError> {
        Ok(self.conversations().list(request).await?)
    }
}

/// Live-mode authenticator: builds a client and runs `auth.test`
pub struct SlackAuthenticator {
    builder: SlackClientBuilder,
}

impl SlackAuthenticator {
    pub fn new(builder: SlackClientBuilder) -> Self {
        Self { builder }
    }
}

#[async_trait::async_trait]
impl Authenticator for SlackAuthenticator {
    async fn authenticate(&self) -> BridgeResult<Session> {
        let client = self
            .builder
            .clone()
            .build()
            .map_err(|e| BridgeError::Authentication(e.to_string()))?;

        let me = client.auth().test().await.map_err(classify)?;

        let identity = SessionIdentity {
            team: me.team,
            team_id: me.team_id,
            user: me.user,
            user_id: me.user_id,
            url: me.url,
        };
        Ok(Session::new(Arc::new(client), identity, SessionMode::Live))
    }
}

fn classify(err: SlackError) -> BridgeError {
    if err.is_auth_error() {
        BridgeError::Authentication(err.to_string())
    } else {
        BridgeError::Upstream {
            page: 0,
            source: Box::new(err),
        }
    }
}
