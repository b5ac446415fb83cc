//! Auth API methods.

use crate::client::SlackClient;
use crate::error::SlackResult;
use serde::{Deserialize, Serialize};

/// Auth API for validating credentials.
pub struct AuthApi<'a> {
    client: &'a SlackClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a SlackClient) -> Self {
        Self { client }
    }

    /// Check the credentials and report who they belong to.
    pub async fn test(&self) -> SlackResult<AuthTestResponse> {
        let no_params: [(&str, &str); 0] = [];
        self.client.http.post_form("auth.test", &no_params).await
    }
}

/// `auth.test` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthTestResponse {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub team_id: String,
    #[serde(default)]
    pub user_id: String,
}
