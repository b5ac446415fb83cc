pub mod channels;
mod registry;

pub use channels::{ChannelsListTool, CHANNELS_LIST};
pub use registry::{json_schema_array, json_schema_object, Tool, ToolRegistry};
