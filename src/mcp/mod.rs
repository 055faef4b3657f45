//! Model Context Protocol (MCP) client implementation.
//!
//! This module provides a one-shot MCP client that talks JSON-RPC 2.0 to tool
//! servers over either a local subprocess (stdio) or an HTTP endpoint that
//! streams its reply as server-sent events.
//!
//! # Configuration
//!
//! Servers are described by a partial descriptor that is normalized into a
//! [`config::ServerConfig`]:
//!
//! ```json
//! { "id": "time", "transport": "stdio", "command": "npx", "args": ["-y", "@mcpcentral/mcp-time"] }
//! { "id": "search", "url": "https://mcp.example.com/mcp", "headers": { "Authorization": "Bearer ..." } }
//! ```
//!
//! Well-known managed servers (see [`managed`]) have their transport, URL and
//! credential header pinned regardless of what the caller sends.
//!
//! # Example
//!
//! ```rust,no_run
//! use nexus_mcp::mcp::{McpClient, SchemaCache, ServerConfigInput, build_server_config};
//!
//! # async fn example() -> Result<(), nexus_mcp::McpError> {
//! let config = build_server_config(&ServerConfigInput {
//!     url: Some("http://localhost:8080/mcp".to_string()),
//!     ..Default::default()
//! });
//! let client = McpClient::new(config, SchemaCache::new())?;
//! let tools = client.list_tools().await?;
//! println!("{} tool(s)", tools.len());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod managed;
pub mod sse;
pub mod sse_client;
pub mod stdio_client;
pub mod transport;
pub mod types;

pub use cache::SchemaCache;
pub use client::{CallOptions, HealthStatus, McpClient, ToolListing};
pub use config::{Endpoint, ServerConfig, ServerConfigInput, TransportKind, build_server_config};
pub use managed::{ensure_managed_config, ensure_managed_google_config, validate_managed_config};
pub use types::{RpcRequest, RpcResponse, ToolSchema};
