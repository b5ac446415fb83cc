// Demo mode: a local stand-in for the Slack workspace, selected explicitly by
// configuration. Nothing here contacts the network.

use crate::error::{BoxError, BridgeResult};
use crate::session::{Authenticator, Session, SessionIdentity, SessionMode};
use crate::types::{
    ConversationsApi, ConversationsPage, Conversation, ListConversationsRequest, TextValue,
};
use std::sync::Arc;

/// Fixture-backed listing endpoint.
///
/// Honors the type filter and paginates by `limit`, using the record offset
/// as the cursor.
pub struct DemoConversations {
    conversations: Vec<Conversation>,
}

impl DemoConversations {
    pub fn new() -> Self {
        Self::with_conversations(fixture())
    }

    pub fn with_conversations(conversations: Vec<Conversation>) -> Self {
        Self { conversations }
    }
}

impl Default for DemoConversations {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ConversationsApi for DemoConversations {
    async fn list_conversations(
        &self,
        request: &ListConversationsRequest,
    ) -> Result<ConversationsPage, BoxError> {
        let offset: usize = if request.cursor.is_empty() {
            0
        } else {
            request
                .cursor
                .parse()
                .map_err(|_| format!("invalid_cursor: {}", request.cursor))?
        };
        let limit = request.limit.max(1) as usize;

        let matching: Vec<&Conversation> = self
            .conversations
            .iter()
            .filter(|c| request.types.contains(&c.kind()))
            .collect();

        let channels: Vec<Conversation> = matching
            .iter()
            .skip(offset)
            .take(limit)
            .map(|c| (*c).clone())
            .collect();

        let next = offset + channels.len();
        let next_cursor = if next < matching.len() {
            next.to_string()
        } else {
            String::new()
        };

        Ok(ConversationsPage {
            channels,
            next_cursor,
        })
    }
}

/// Authenticator that yields a demo session without any handshake
pub struct DemoAuthenticator;

#[async_trait::async_trait]
impl Authenticator for DemoAuthenticator {
    async fn authenticate(&self) -> BridgeResult<Session> {
        tracing::info!("Demo credentials are set, skipping Slack handshake");
        Ok(Session::new(
            Arc::new(DemoConversations::new()),
            SessionIdentity {
                team: "Demo Workspace".to_string(),
                team_id: "T00000000".to_string(),
                user: "demo".to_string(),
                user_id: "U00000000".to_string(),
                url: "https://demo.slack.com/".to_string(),
            },
            SessionMode::Demo,
        ))
    }
}

fn channel(id: &str, name: &str, topic: &str, purpose: &str, members: u64, private: bool) -> Conversation {
    Conversation {
        id: id.to_string(),
        name: Some(name.to_string()),
        topic: Some(TextValue::new(topic)),
        purpose: Some(TextValue::new(purpose)),
        num_members: Some(members),
        is_channel: !private,
        is_private: private,
        ..Default::default()
    }
}

fn fixture() -> Vec<Conversation> {
    vec![
        channel("C0000000001", "general", "Company-wide announcements", "This channel is for workspace-wide communication", 42, false),
        channel("C0000000002", "random", "", "Non-work banter and water cooler conversation", 38, false),
        channel("C0000000003", "engineering", "Deploys on Tuesdays", "Engineering discussion, \"all\" welcome", 17, false),
        channel("C0000000004", "leadership", "", "Private planning", 5, true),
        Conversation {
            id: "G0000000001".to_string(),
            name: Some("mpdm-ann--bob--cid-1".to_string()),
            purpose: Some(TextValue::new("Group messaging with: @ann @bob @cid")),
            num_members: Some(3),
            is_mpim: true,
            is_private: true,
            ..Default::default()
        },
        Conversation {
            id: "D0000000001".to_string(),
            user: Some("U0000000002".to_string()),
            is_im: true,
            ..Default::default()
        },
    ]
}
