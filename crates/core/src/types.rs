use crate::error::BoxError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of Slack conversation, as named by `conversations.list`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    Mpim,
    Im,
    PublicChannel,
    PrivateChannel,
}

impl ChannelType {
    pub const ALL: [ChannelType; 4] = [
        ChannelType::Mpim,
        ChannelType::Im,
        ChannelType::PublicChannel,
        ChannelType::PrivateChannel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelType::Mpim => "mpim",
            ChannelType::Im => "im",
            ChannelType::PublicChannel => "public_channel",
            ChannelType::PrivateChannel => "private_channel",
        }
    }

    /// Default filter when a caller names no types
    pub fn defaults() -> Vec<ChannelType> {
        vec![ChannelType::PublicChannel]
    }

    /// Comma-joined wire form used by the `types` query parameter
    pub fn join(types: &[ChannelType]) -> String {
        types
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl std::fmt::Display for ChannelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown channel type '{0}' (expected one of: mpim, im, public_channel, private_channel)")]
pub struct UnknownChannelType(pub String);

impl FromStr for ChannelType {
    type Err = UnknownChannelType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "mpim" => Ok(ChannelType::Mpim),
            "im" => Ok(ChannelType::Im),
            "public_channel" => Ok(ChannelType::PublicChannel),
            "private_channel" => Ok(ChannelType::PrivateChannel),
            other => Err(UnknownChannelType(other.to_string())),
        }
    }
}

/// Ordering applied to normalized rows.
///
/// Parsing is total: anything that is not a known policy name falls back to
/// `Unsorted`, which keeps rows in the order the upstream returned them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortPolicy {
    #[default]
    Popularity,
    Unsorted,
}

impl SortPolicy {
    pub fn parse(name: &str) -> Self {
        match name {
            "popularity" => SortPolicy::Popularity,
            _ => SortPolicy::Unsorted,
        }
    }
}

/// `{ "value": "..." }` wrapper Slack uses for topic and purpose
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextValue {
    #[serde(default)]
    pub value: String,
}

impl TextValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// A raw conversation record as returned by `conversations.list`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub topic: Option<TextValue>,
    #[serde(default)]
    pub purpose: Option<TextValue>,
    #[serde(default)]
    pub num_members: Option<u64>,
    #[serde(default)]
    pub is_channel: bool,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub is_im: bool,
    #[serde(default)]
    pub is_mpim: bool,
    /// Counterpart user ID, only set on direct messages
    #[serde(default)]
    pub user: Option<String>,
}

impl Conversation {
    pub fn kind(&self) -> ChannelType {
        if self.is_im {
            ChannelType::Im
        } else if self.is_mpim {
            ChannelType::Mpim
        } else if self.is_private {
            ChannelType::PrivateChannel
        } else {
            ChannelType::PublicChannel
        }
    }
}

/// Parameters for one `conversations.list` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListConversationsRequest {
    pub types: Vec<ChannelType>,
    pub limit: u32,
    pub exclude_archived: bool,
    /// Empty on the first call
    pub cursor: String,
}

impl ListConversationsRequest {
    pub fn new(types: Vec<ChannelType>) -> Self {
        Self {
            types,
            limit: 100,
            exclude_archived: true,
            cursor: String::new(),
        }
    }
}

/// One page of a conversations listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationsPage {
    pub channels: Vec<Conversation>,
    /// Empty string when there are no more pages
    pub next_cursor: String,
}

/// Upstream listing endpoint.
///
/// Implemented by the Slack SDK client and by the demo fixture. A single
/// instance is shared across concurrent fetches.
#[async_trait::async_trait]
pub trait ConversationsApi: Send + Sync {
    async fn list_conversations(
        &self,
        request: &ListConversationsRequest,
    ) -> Result<ConversationsPage, BoxError>;
}

/// Normalized, flat channel row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRow {
    pub id: String,
    pub name: String,
    pub topic: String,
    pub purpose: String,
    #[serde(rename = "memberCount")]
    pub member_count: u64,
}

impl ChannelRow {
    pub const HEADER: [&'static str; 5] = ["id", "name", "topic", "purpose", "memberCount"];
}
