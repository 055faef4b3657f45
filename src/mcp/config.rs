//! Server descriptors: the partial input accepted from callers, the canonical
//! [`ServerConfig`], and the transport [`Endpoint`] resolved from it at call time.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::mcp::types::ToolSchema;

const DEFAULT_SERVER_NAME: &str = "MCP Server";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Stdio,
    #[default]
    Http,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Stdio => write!(f, "stdio"),
            TransportKind::Http => write!(f, "http"),
        }
    }
}

/// Partial server descriptor as supplied by a caller. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfigInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub transport: Option<TransportKind>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Option<Vec<String>>,
    #[serde(default)]
    pub env: Option<HashMap<String, String>>,
    #[serde(default)]
    pub tools: Option<Vec<ToolSchema>>,
}

/// Canonical server configuration.
///
/// Transport-specific fields stay optional here; [`ServerConfig::endpoint`]
/// checks them when a call is about to be made.
#[derive(Clone, Serialize)]
pub struct ServerConfig {
    pub id: String,
    pub name: String,
    pub transport: TransportKind,
    pub url: Option<String>,
    pub headers: HashMap<String, String>,
    pub command: Option<String>,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub tools: Option<Vec<ToolSchema>>,
}

// Header and env values routinely carry API keys.
impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header_names: Vec<&String> = self.headers.keys().collect();
        let env_names: Vec<&String> = self.env.keys().collect();
        f.debug_struct("ServerConfig")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("transport", &self.transport)
            .field("url", &self.url)
            .field("headers", &header_names)
            .field("command", &self.command)
            .field("args", &self.args)
            .field("env", &env_names)
            .field("tool_count", &self.tools.as_ref().map(Vec::len))
            .finish()
    }
}

/// Normalize a partial descriptor into a [`ServerConfig`].
///
/// Missing `id` gets a fresh `mcp-<uuid>`, missing `transport` defaults to
/// HTTP. Maps are copied, never shared with the input.
pub fn build_server_config(input: &ServerConfigInput) -> ServerConfig {
    ServerConfig {
        id: input
            .id
            .clone()
            .unwrap_or_else(|| format!("mcp-{}", Uuid::new_v4())),
        name: input
            .name
            .clone()
            .unwrap_or_else(|| DEFAULT_SERVER_NAME.to_string()),
        transport: input.transport.unwrap_or_default(),
        url: input.url.clone(),
        headers: input.headers.clone().unwrap_or_default(),
        command: input.command.clone(),
        args: input.args.clone().unwrap_or_default(),
        env: input.env.clone().unwrap_or_default(),
        tools: input.tools.clone(),
    }
}

impl From<ServerConfigInput> for ServerConfig {
    fn from(input: ServerConfigInput) -> Self {
        build_server_config(&input)
    }
}

/// A transport target with its required fields present.
///
/// Transports are built from an `Endpoint`, never from a bare
/// [`ServerConfig`], so a stdio call without a command or an HTTP call
/// without a URL cannot be expressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Stdio {
        command: String,
        args: Vec<String>,
        env: HashMap<String, String>,
    },
    Http {
        url: Url,
        headers: HashMap<String, String>,
    },
}

impl ServerConfig {
    /// Resolve the transport target, failing if its required field is absent.
    pub fn endpoint(&self) -> Result<Endpoint, ValidationError> {
        match self.transport {
            TransportKind::Stdio => {
                let command = self
                    .command
                    .as_deref()
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .ok_or(ValidationError::MissingCommand)?;
                Ok(Endpoint::Stdio {
                    command: command.to_string(),
                    args: self.args.clone(),
                    env: self.env.clone(),
                })
            }
            TransportKind::Http => {
                let raw = self
                    .url
                    .as_deref()
                    .map(str::trim)
                    .filter(|u| !u.is_empty())
                    .ok_or(ValidationError::MissingUrl)?;
                let invalid = || ValidationError::InvalidUrl {
                    url: raw.to_string(),
                };
                let url = Url::parse(raw).ok().ok_or_else(invalid)?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(invalid());
                }
                Ok(Endpoint::Http {
                    url,
                    headers: self.headers.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let config = build_server_config(&ServerConfigInput::default());
        assert!(config.id.starts_with("mcp-"));
        assert_eq!(config.name, "MCP Server");
        assert_eq!(config.transport, TransportKind::Http);
        assert!(config.headers.is_empty());
        assert!(config.args.is_empty());
    }

    #[test]
    fn test_generated_ids_differ() {
        let a = build_server_config(&ServerConfigInput::default());
        let b = build_server_config(&ServerConfigInput::default());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_headers_are_copied() {
        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), "Bearer a".to_string());
        let input = ServerConfigInput {
            id: Some("s1".to_string()),
            headers: Some(headers),
            ..Default::default()
        };

        let mut config = build_server_config(&input);
        config
            .headers
            .insert("Authorization".to_string(), "Bearer b".to_string());
        config.headers.insert("X-Extra".to_string(), "1".to_string());

        let original = input.headers.as_ref().unwrap();
        assert_eq!(original.len(), 1);
        assert_eq!(original["Authorization"], "Bearer a");
    }

    #[test]
    fn test_builder_defers_validation() {
        let input = ServerConfigInput {
            transport: Some(TransportKind::Stdio),
            ..Default::default()
        };
        let config = build_server_config(&input);
        assert_eq!(config.endpoint(), Err(ValidationError::MissingCommand));
    }

    #[test]
    fn test_http_requires_url() {
        let config = build_server_config(&ServerConfigInput::default());
        assert_eq!(config.endpoint(), Err(ValidationError::MissingUrl));

        let config = build_server_config(&ServerConfigInput {
            url: Some("not a url".to_string()),
            ..Default::default()
        });
        assert!(matches!(
            config.endpoint(),
            Err(ValidationError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_resolves_endpoints() {
        let config = build_server_config(&ServerConfigInput {
            url: Some("http://host/rpc".to_string()),
            ..Default::default()
        });
        assert!(matches!(
            config.endpoint().unwrap(),
            Endpoint::Http { url, .. } if url.as_str() == "http://host/rpc"
        ));

        let config = build_server_config(&ServerConfigInput {
            transport: Some(TransportKind::Stdio),
            command: Some("node".to_string()),
            args: Some(vec!["server.js".to_string()]),
            ..Default::default()
        });
        assert!(matches!(
            config.endpoint().unwrap(),
            Endpoint::Stdio { command, args, .. } if command == "node" && args.len() == 1
        ));
    }

    #[test]
    fn test_input_deserializes_camel_case() {
        let input: ServerConfigInput = serde_json::from_str(
            r#"{"id":"s1","transport":"stdio","command":"cat","args":["-"],"env":{"A":"1"}}"#,
        )
        .unwrap();
        assert_eq!(input.transport, Some(TransportKind::Stdio));
        assert_eq!(input.env.unwrap()["A"], "1");
    }

    #[test]
    fn test_debug_redacts_secret_values() {
        let mut headers = HashMap::new();
        headers.insert("X-Goog-Api-Key".to_string(), "secret-value".to_string());
        let config = build_server_config(&ServerConfigInput {
            headers: Some(headers),
            ..Default::default()
        });
        let dbg = format!("{config:?}");
        assert!(dbg.contains("X-Goog-Api-Key"));
        assert!(!dbg.contains("secret-value"));
    }
}
