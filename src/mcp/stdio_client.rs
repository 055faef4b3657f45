use async_trait::async_trait;
use serde_json::Value;
use std::{collections::HashMap, process::Stdio};
use tokio::{io::AsyncWriteExt, process::Command};

use crate::error::{McpError, TransportError};
use crate::mcp::transport::Transport;
use crate::mcp::types::RpcRequest;

/// One-shot stdio transport.
///
/// Each exchange spawns the server, writes a single JSON request to its
/// stdin, closes stdin, and parses everything the process wrote to stdout as
/// exactly one JSON document once it exits.
#[derive(Debug, Clone)]
pub struct StdioTransport {
    command: String,
    args: Vec<String>,
    env: HashMap<String, String>,
}

impl StdioTransport {
    pub fn new(command: String, args: Vec<String>, env: HashMap<String, String>) -> Self {
        Self { command, args, env }
    }
}

#[async_trait]
impl Transport for StdioTransport {
    async fn exchange(&self, request: &RpcRequest) -> Result<Value, McpError> {
        let payload = serde_json::to_vec(request).map_err(TransportError::Encode)?;

        // The child inherits the process environment; config values win.
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args)
            .envs(&self.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| TransportError::Spawn {
            command: self.command.clone(),
            source,
        })?;

        tracing::debug!(
            name: "mcp.stdio.spawned",
            command = %self.command,
            pid = ?child.id(),
            "MCP process spawned"
        );

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| TransportError::Io(std::io::Error::other("missing stdin")))?;

        // Write and collect concurrently so a chatty server cannot deadlock us.
        let write = async move {
            stdin.write_all(&payload).await?;
            stdin.shutdown().await
        };
        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output.map_err(TransportError::Io)?;

        if let Err(e) = written {
            // A server that exits without draining stdin is judged by its status.
            tracing::debug!(
                name: "mcp.stdio.write_failed",
                command = %self.command,
                error = %e,
                "Failed to write request to MCP process"
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            return Err(TransportError::ProcessFailed {
                code: output.status.code(),
                stderr: if stderr.is_empty() {
                    "<none>".to_string()
                } else {
                    stderr.to_string()
                },
            }
            .into());
        }

        serde_json::from_str(&stdout).map_err(|source| {
            TransportError::InvalidOutput {
                source,
                raw: stdout.to_string(),
            }
            .into()
        })
    }
}
