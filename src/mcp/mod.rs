pub mod handlers;
pub mod http;
pub mod jsonrpc;
pub mod stdio;
pub mod tooling;

pub use http::{
    call_tool, call_tool_inner, list_tools, McpCallRequest, McpCallResponse, McpContent, McpTool,
    McpToolsResponse,
};
