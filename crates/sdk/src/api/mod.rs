//! Web API method groups.

mod auth;
mod conversations;

pub use auth::{AuthApi, AuthTestResponse};
pub use conversations::ConversationsApi;
