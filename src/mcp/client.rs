//! Client facade: `list_tools`, `call` and `health` over a single server config.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{McpError, TransportError};
use crate::mcp::cache::SchemaCache;
use crate::mcp::config::{ServerConfig, TransportKind};
use crate::mcp::managed::validate_managed_config;
use crate::mcp::sse::DEFAULT_MAX_EVENT_BYTES;
use crate::mcp::transport;
use crate::mcp::types::{RpcRequest, ToolSchema, resolve_payload};

/// Default deadline for one exchange.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-call limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallOptions {
    /// Deadline for one exchange, including process spawn or connect.
    pub timeout: Duration,
    /// Largest unterminated SSE event buffered before giving up.
    pub max_sse_buffer: usize,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_CALL_TIMEOUT,
            max_sse_buffer: DEFAULT_MAX_EVENT_BYTES,
        }
    }
}

/// Result of a health probe. Failures are reported here, never raised.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    pub healthy: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Shapes a `tools/list` response may take, checked in this order.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolListing {
    /// The response is itself an array of tools.
    Array(Vec<ToolSchema>),
    /// The response is an object with a `tools` array.
    Wrapped(Vec<ToolSchema>),
    /// Anything else.
    Unrecognized,
}

impl ToolListing {
    /// Classify a response. Array elements that are not tool schemas are
    /// skipped one by one; the rest of the array is kept.
    pub fn from_response(response: &Value) -> Self {
        match response {
            Value::Array(items) => Self::Array(read_tools(items)),
            Value::Object(obj) => match obj.get("tools") {
                Some(Value::Array(items)) => Self::Wrapped(read_tools(items)),
                _ => Self::Unrecognized,
            },
            _ => Self::Unrecognized,
        }
    }

    pub fn into_tools(self) -> Vec<ToolSchema> {
        match self {
            Self::Array(tools) | Self::Wrapped(tools) => tools,
            Self::Unrecognized => Vec::new(),
        }
    }
}

fn read_tools(items: &[Value]) -> Vec<ToolSchema> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match ToolSchema::deserialize(item) {
            Ok(tool) => Some(tool),
            Err(e) => {
                tracing::warn!(
                    name: "mcp.tools.skipped",
                    index,
                    error = %e,
                    "Skipping unreadable tool entry"
                );
                None
            }
        })
        .collect()
}

/// MCP client bound to one server config and a shared schema cache.
#[derive(Debug, Clone)]
pub struct McpClient {
    config: ServerConfig,
    cache: SchemaCache,
    http: reqwest::Client,
    options: CallOptions,
}

impl McpClient {
    /// Create a client. Managed-server policy is validated here, so a config
    /// that violates it never reaches a transport.
    pub fn new(config: ServerConfig, cache: SchemaCache) -> Result<Self, McpError> {
        validate_managed_config(&config)?;
        Ok(Self {
            config,
            cache,
            http: reqwest::Client::new(),
            options: CallOptions::default(),
        })
    }

    /// Use a shared HTTP client (connection pool) for the SSE transport.
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    /// List the server's tools, served from the schema cache while fresh.
    ///
    /// An empty or unrecognized listing falls back to the config's static
    /// tools. The final list, even if empty, is cached.
    pub async fn list_tools(&self) -> Result<Arc<Vec<ToolSchema>>, McpError> {
        if let Some(cached) = self.cache.get(&self.config.id) {
            tracing::debug!(
                name: "mcp.tools.cache_hit",
                server_id = %self.config.id,
                tool_count = cached.len(),
                "Serving tools from schema cache"
            );
            return Ok(cached);
        }

        let response = self.call("tools/list", Map::new()).await?;
        let listing = ToolListing::from_response(&response);
        if listing == ToolListing::Unrecognized {
            tracing::warn!(
                name: "mcp.tools.unrecognized",
                server_id = %self.config.id,
                "tools/list returned an unrecognized shape"
            );
        }

        let mut tools = listing.into_tools();
        if tools.is_empty() {
            tools = self.config.tools.clone().unwrap_or_default();
        }

        tracing::info!(
            name: "mcp.tools.listed",
            server_id = %self.config.id,
            tool_count = tools.len(),
            "MCP tools discovered"
        );

        Ok(self.cache.set(&self.config.id, tools))
    }

    /// Invoke `method` with `params` and return the resolved result.
    pub async fn call(&self, method: &str, params: Map<String, Value>) -> Result<Value, McpError> {
        let endpoint = self.config.endpoint()?;
        let transport = transport::for_endpoint(endpoint, &self.http, self.options.max_sse_buffer)?;
        let request = RpcRequest::new(method, params);

        tracing::info!(
            name: "mcp.call.started",
            server_id = %self.config.id,
            transport = %self.config.transport,
            method,
            request_id = %request.id,
            "MCP call started"
        );

        let started = Instant::now();
        let outcome = match tokio::time::timeout(self.options.timeout, transport.exchange(&request))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(TransportError::DeadlineExceeded(self.options.timeout).into()),
        };

        // Stdio returns the raw document; HTTP has already resolved it.
        let outcome = match (outcome, self.config.transport) {
            (Ok(doc), TransportKind::Stdio) => resolve_payload(doc),
            (other, _) => other,
        };

        match &outcome {
            Ok(_) => tracing::info!(
                name: "mcp.call.finished",
                server_id = %self.config.id,
                method,
                request_id = %request.id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "MCP call finished"
            ),
            Err(e) => tracing::warn!(
                name: "mcp.call.failed",
                server_id = %self.config.id,
                method,
                request_id = %request.id,
                error = %e,
                "MCP call failed"
            ),
        }

        outcome
    }

    /// Probe the server by listing its tools.
    pub async fn health(&self) -> HealthStatus {
        match self.list_tools().await {
            Ok(tools) => HealthStatus {
                healthy: true,
                message: format!("Responding with {} tool(s)", tools.len()),
                timestamp: Utc::now(),
            },
            Err(e) => HealthStatus {
                healthy: false,
                message: e.to_string(),
                timestamp: Utc::now(),
            },
        }
    }
}
