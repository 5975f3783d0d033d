//! JSON-RPC 2.0 tool protocol over HTTP.
//!
//! Methods: `initialize`, `notifications/initialized`, `tools/list`, `tools/call`.
//! The [`server`] half exposes a [`crate::tools::ToolRegistry`]; the [`client`]
//! half discovers and invokes tools on a remote server.

pub mod client;
pub mod server;

pub use client::{McpClient, RemoteTool};
pub use server::router;

pub const JSONRPC_VERSION: &str = "2.0";
pub const PROTOCOL_VERSION: &str = "2025-06-18";
pub const SESSION_HEADER: &str = "mcp-session-id";

pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
