//! Transport seam between the client facade and the wire.
//!
//! Transports are stateless and one-shot: every exchange opens its own process
//! or connection, and nothing is retried.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::McpError;
use crate::mcp::config::Endpoint;
use crate::mcp::sse_client::SseTransport;
use crate::mcp::stdio_client::StdioTransport;
use crate::mcp::types::RpcRequest;

#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Send one request and return the server's response value.
    async fn exchange(&self, request: &RpcRequest) -> Result<Value, McpError>;
}

/// Build the transport for a resolved endpoint.
pub fn for_endpoint(
    endpoint: Endpoint,
    http: &reqwest::Client,
    max_event_bytes: usize,
) -> Result<Box<dyn Transport>, McpError> {
    match endpoint {
        Endpoint::Stdio { command, args, env } => {
            Ok(Box::new(StdioTransport::new(command, args, env)))
        }
        Endpoint::Http { url, headers } => Ok(Box::new(SseTransport::new(
            http.clone(),
            url,
            &headers,
            max_event_bytes,
        )?)),
    }
}
