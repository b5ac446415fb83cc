//! The channels pipeline: resolve session, fetch, normalize, sort, encode.

use crate::encode::encode;
use crate::error::BridgeResult;
use crate::fetch::{fetch_all, FetchOptions};
use crate::normalize::{normalize, sort};
use crate::session::SessionProvider;
use crate::types::{ChannelType, ListConversationsRequest, SortPolicy};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Fully resolved parameters for one channels listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelsQuery {
    pub types: Vec<ChannelType>,
    pub sort: SortPolicy,
}

impl Default for ChannelsQuery {
    fn default() -> Self {
        Self {
            types: ChannelType::defaults(),
            sort: SortPolicy::default(),
        }
    }
}

/// Runs channel listings against the shared session
pub struct ChannelsService {
    provider: Arc<SessionProvider>,
    options: FetchOptions,
}

impl ChannelsService {
    pub fn new(provider: Arc<SessionProvider>, options: FetchOptions) -> Self {
        Self { provider, options }
    }

    pub fn provider(&self) -> &Arc<SessionProvider> {
        &self.provider
    }

    /// List channels as CSV text.
    ///
    /// Fails as a whole on any step; there is no partial output.
    pub async fn list(&self, query: &ChannelsQuery, cancel: &CancellationToken) -> BridgeResult<String> {
        let session = self.provider.resolve(cancel).await?;

        let request = ListConversationsRequest::new(query.types.clone());
        let conversations = fetch_all(session.api(), request, self.options, cancel).await?;

        let mut rows = normalize(conversations);
        sort(&mut rows, query.sort);

        encode(&rows)
    }
}
