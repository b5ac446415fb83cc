//! Raw conversations to flat rows, and row ordering.

use crate::types::{ChannelRow, ChannelType, Conversation, SortPolicy};

const CHANNEL_PREFIX: char = '#';
const DIRECT_PREFIX: char = '@';

/// Map upstream records to rows, one row per record, preserving order
pub fn normalize(conversations: Vec<Conversation>) -> Vec<ChannelRow> {
    conversations.into_iter().map(to_row).collect()
}

fn to_row(conversation: Conversation) -> ChannelRow {
    let name = display_name(&conversation);
    ChannelRow {
        id: conversation.id,
        name,
        topic: conversation.topic.map(|t| t.value).unwrap_or_default(),
        purpose: conversation.purpose.map(|p| p.value).unwrap_or_default(),
        member_count: conversation.num_members.unwrap_or(0),
    }
}

/// Human-facing name for a conversation.
///
/// Channels (public or private) get `#name`. Group DMs get `@name`. Direct
/// messages have no name upstream, so they get `@` plus the counterpart
/// user ID. Nothing to decorate yields an empty name, not a bare prefix.
pub fn display_name(conversation: &Conversation) -> String {
    let name = conversation.name.as_deref().unwrap_or("");
    let (prefix, base) = match conversation.kind() {
        ChannelType::PublicChannel | ChannelType::PrivateChannel => (CHANNEL_PREFIX, name),
        ChannelType::Mpim => (DIRECT_PREFIX, name),
        ChannelType::Im => {
            let user = conversation.user.as_deref().unwrap_or("");
            (DIRECT_PREFIX, if user.is_empty() { name } else { user })
        }
    };

    if base.is_empty() {
        String::new()
    } else {
        format!("{prefix}{base}")
    }
}

/// Apply an ordering policy in place.
///
/// `Popularity` is a stable descending sort on member count. `Unsorted`
/// leaves the rows exactly as they are.
pub fn sort(rows: &mut [ChannelRow], policy: SortPolicy) {
    match policy {
        SortPolicy::Popularity => rows.sort_by(|a, b| b.member_count.cmp(&a.member_count)),
        SortPolicy::Unsorted => {}
    }
}
