//! Transport layer for the Slack SDK.

pub mod http;

pub use http::HttpTransport;
