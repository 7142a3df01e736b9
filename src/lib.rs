pub mod core;
pub mod features;
pub mod mcp;
pub mod server;
pub mod tools;

// --- Primary core exports ---
pub use core::error::{SeoError, SeoResult, TokenError};
pub use core::types;
pub use core::types::*;
pub use core::AppState;

// --- Short module paths ---
pub use features::{antibot, captcha, signature_cache};
pub use mcp::handlers as mcp_handlers;
pub use mcp::stdio as stdio_service;
