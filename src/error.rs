//! Error types for MCP client operations.
//!
//! Every failure raised by the client falls into one of four kinds:
//! configuration, validation, transport, or a protocol error returned by the
//! remote server. The `Display` text of each variant is the message surfaced
//! to callers (and reported verbatim by health probes).

use std::time::Duration;

use thiserror::Error;

/// Top-level error for config resolution, transports and the client facade.
#[derive(Error, Debug)]
pub enum McpError {
    /// A required secret is missing or a managed-server invariant is violated.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// A transport-specific required field is absent or malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The exchange with the server failed below the protocol layer.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server returned a well-formed response carrying an `error` object.
    #[error("{message}")]
    Protocol {
        /// JSON-RPC error code, if the server sent one.
        code: Option<i64>,
        /// Error message from the server.
        message: String,
        /// Additional error data from the server.
        data: Option<serde_json::Value>,
    },
}

impl McpError {
    /// Whether the error was caused by malformed caller input rather than
    /// a server-side or remote failure.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Managed-server policy failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing {var} environment variable")]
    MissingSecret { var: String },

    #[error("{server} must use HTTP/SSE transport")]
    WrongTransport { server: String },

    #[error("{server} must target {expected}")]
    WrongUrl { server: String, expected: String },

    #[error("{server} requires an API key header ({header})")]
    MissingHeader { server: String, header: String },

    #[error("{server} accepts exactly one {header} header")]
    DuplicateHeader { server: String, header: String },
}

/// Required-field failures, detected before any I/O.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Stdio transport requires a command to spawn")]
    MissingCommand,

    #[error("HTTP transport requires a target URL")]
    MissingUrl,

    #[error("Invalid MCP server URL: {url}")]
    InvalidUrl { url: String },

    #[error("Invalid header {name:?} in MCP server config")]
    InvalidHeader { name: String },
}

/// Failures of the underlying channel.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The server process could not be started.
    #[error("Failed to spawn MCP process `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O with a running server process failed.
    #[error("MCP process I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The server process terminated unsuccessfully.
    #[error("Local MCP process exited with code {}. stderr: {stderr}", exit_code_label(*.code))]
    ProcessFailed { code: Option<i32>, stderr: String },

    /// The server process exited cleanly but its output is not JSON.
    #[error("Unable to parse MCP stdio response: {source}. Raw output: {raw}")]
    InvalidOutput {
        #[source]
        source: serde_json::Error,
        raw: String,
    },

    /// The HTTP endpoint answered with a non-success status.
    #[error("MCP HTTP transport responded with {status}. Body: {body}")]
    HttpStatus { status: u16, body: String },

    /// The HTTP request or response stream failed.
    #[error("MCP HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The request envelope could not be serialized.
    #[error("Unable to encode JSON-RPC request: {0}")]
    Encode(#[from] serde_json::Error),

    /// A single SSE event grew past the configured buffer limit.
    #[error("SSE event exceeded the {limit} byte buffer limit")]
    StreamOverflow { limit: usize },

    /// The SSE stream ended without a parseable JSON payload.
    #[error("No JSON-RPC payload received from SSE stream")]
    NoPayload,

    /// The call did not complete within its deadline.
    #[error("MCP call timed out after {0:?}")]
    DeadlineExceeded(Duration),
}

fn exit_code_label(code: Option<i32>) -> String {
    code.map_or_else(|| "<signal>".to_string(), |c| c.to_string())
}

/// Result type alias for MCP operations.
pub type Result<T> = std::result::Result<T, McpError>;
