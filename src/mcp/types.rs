use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::McpError;

/// JSON-RPC protocol version carried by every envelope.
pub const JSONRPC_VERSION: &str = "2.0";

/// Outgoing JSON-RPC request. A fresh id is minted for every call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: String,
    pub method: String,
    pub params: Map<String, Value>,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: format!("mcp-{}", Uuid::new_v4()),
            method: method.into(),
            params,
        }
    }
}

/// Incoming JSON-RPC response envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RpcResponse {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcErrorObject {
    #[serde(default)]
    pub code: Option<i64>,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Turn a decoded payload into the call result.
///
/// A payload with an `error` member becomes [`McpError::Protocol`]; otherwise
/// its `result` member is returned, or the whole payload if there is none.
pub fn resolve_payload(payload: Value) -> Result<Value, McpError> {
    let Value::Object(mut obj) = payload else {
        return Ok(payload);
    };

    if obj.get("error").is_some_and(|e| !e.is_null()) {
        return Err(protocol_error(obj.remove("error").unwrap_or_default()));
    }

    if obj.get("result").is_some_and(|r| !r.is_null()) {
        return Ok(obj.remove("result").unwrap_or_default());
    }

    // Returned untouched, null members included.
    Ok(Value::Object(obj))
}

fn protocol_error(error: Value) -> McpError {
    match serde_json::from_value::<RpcErrorObject>(error.clone()) {
        Ok(e) => McpError::Protocol {
            code: e.code,
            message: e.message,
            data: e.data,
        },
        Err(_) => McpError::Protocol {
            code: None,
            message: match error {
                Value::String(s) => s,
                other => other.to_string(),
            },
            data: None,
        },
    }
}

/// Metadata describing one invocable tool.
///
/// Servers that follow the MCP tool shape send `inputSchema` and no `id`;
/// both forms are accepted and `id` falls back to `name`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ToolSchema {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct RawToolSchema {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    schema: Option<Map<String, Value>>,
    #[serde(default, rename = "inputSchema")]
    input_schema: Option<Map<String, Value>>,
    #[serde(default)]
    categories: Option<Vec<String>>,
}

impl<'de> Deserialize<'de> for ToolSchema {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawToolSchema::deserialize(deserializer)?;
        Ok(Self {
            id: raw.id.unwrap_or_else(|| raw.name.clone()),
            name: raw.name,
            description: raw.description,
            schema: raw.schema.or(raw.input_schema),
            categories: raw.categories,
        })
    }
}
