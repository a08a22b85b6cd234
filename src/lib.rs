//! MCP server exposing Pollinations.ai image and text generation as tools.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod mcp_server;
pub mod pollinations;
pub mod shutdown;
pub mod storage;
pub mod tools;
pub mod url_builder;
pub mod validation;

pub use config::{Config, Transport};
pub use dispatcher::{Dispatcher, ToolName, ToolRequest};
pub use error::{DispatchError, ToolError};
pub use mcp_server::PollinationsServer;
pub use shutdown::Shutdown;
