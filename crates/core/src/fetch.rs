//! Cursor-driven pagination over the conversations listing.

use crate::error::{BridgeError, BridgeResult};
use crate::types::{Conversation, ConversationsApi, ListConversationsRequest};
use tokio_util::sync::CancellationToken;

/// Tuning for one pagination loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Page-size hint sent as `limit`
    pub page_size: u32,
    /// Upper bound on upstream calls before giving up
    pub max_pages: u32,
    pub exclude_archived: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_pages: 1000,
            exclude_archived: true,
        }
    }
}

/// Drain every page of the listing into one ordered collection.
///
/// Pages are requested strictly one after another. Any upstream failure
/// aborts the fetch and discards what was gathered so far. The loop stops
/// once the cursor returned by the call that just completed is empty; that
/// final page's records are kept.
pub async fn fetch_all(
    api: &dyn ConversationsApi,
    mut request: ListConversationsRequest,
    options: FetchOptions,
    cancel: &CancellationToken,
) -> BridgeResult<Vec<Conversation>> {
    request.limit = options.page_size;
    request.exclude_archived = options.exclude_archived;
    request.cursor.clear();

    let mut conversations = Vec::new();
    let mut page: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(BridgeError::Cancelled);
        }
        if page >= options.max_pages {
            tracing::warn!(
                max_pages = options.max_pages,
                fetched = conversations.len(),
                "Conversations pagination hit the page cap"
            );
            return Err(BridgeError::PaginationExhausted {
                max_pages: options.max_pages,
            });
        }
        page += 1;

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(BridgeError::Cancelled),
            result = api.list_conversations(&request) => result,
        };
        let batch = result.map_err(|source| BridgeError::Upstream { page, source })?;

        tracing::debug!(
            page,
            records = batch.channels.len(),
            has_more = !batch.next_cursor.is_empty(),
            "Fetched conversations page"
        );

        conversations.extend(batch.channels);

        if batch.next_cursor.is_empty() {
            break;
        }
        request.cursor = batch.next_cursor;
    }

    tracing::info!(total = conversations.len(), pages = page, "Channels fetch complete");
    Ok(conversations)
}
