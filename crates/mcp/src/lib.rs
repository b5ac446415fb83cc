// MCP (Model Context Protocol) server exposing Slack workspace data as tools

pub mod error;
pub mod protocol;
pub mod server;
pub mod stdio;
pub mod tools;

pub use error::{McpError, McpResult};
pub use server::McpServer;
