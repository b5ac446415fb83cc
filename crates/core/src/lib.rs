// Core bridge between MCP tool calls and the Slack conversations listing

pub mod types;
pub mod error;
pub mod session;
pub mod demo;
pub mod fetch;
pub mod normalize;
pub mod encode;
pub mod channels;

pub use channels::{ChannelsQuery, ChannelsService};
pub use error::{BoxError, BridgeError, BridgeResult};
pub use fetch::{fetch_all, FetchOptions};
pub use session::{Authenticator, Session, SessionIdentity, SessionMode, SessionProvider};
pub use types::*;
