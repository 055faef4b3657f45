use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::sync::Arc;

use tower_http::trace::TraceLayer;

use tracing::info;

use crate::AppState;
use crate::config::AppConfig;
use crate::error::McpError;
use crate::mcp::{
    McpClient, ServerConfigInput, build_server_config, ensure_managed_config, managed::is_managed,
};

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let state = AppState::new(Arc::clone(&config));
    let app = router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;
    Router::new()
        .route("/api/mcp", get(api_mcp_usage).post(api_mcp))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for the MCP proxy API.
#[derive(Debug, Deserialize)]
pub struct McpRouteRequest {
    /// One of `list_tools`, `invoke`, `health`.
    pub action: String,
    /// JSON-RPC method, required for `invoke`.
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub params: Option<Map<String, Value>>,
    #[serde(default)]
    pub config: Option<ServerConfigInput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum McpAction {
    ListTools,
    Invoke,
    Health,
}

impl McpAction {
    fn parse(action: &str) -> Option<Self> {
        match action {
            "list_tools" => Some(Self::ListTools),
            "invoke" => Some(Self::Invoke),
            "health" => Some(Self::Health),
            _ => None,
        }
    }
}

/// Error body returned by the MCP proxy API.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn bad_request(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: error.into(),
                details: None,
            },
        }
    }
}

impl From<McpError> for ApiError {
    fn from(e: McpError) -> Self {
        let status = if e.is_invalid_input() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            body: ErrorBody {
                error: e.to_string(),
                details: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// GET /api/mcp - Usage hint.
async fn api_mcp_usage() -> Json<Value> {
    Json(json!({
        "message": "POST a JSON-RPC payload to proxy through an MCP transport."
    }))
}

/// POST /api/mcp - Run `list_tools`, `invoke` or `health` against a server.
async fn api_mcp(
    State(state): State<AppState>,
    payload: Result<Json<McpRouteRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = payload.map_err(|rejection| ApiError {
        status: StatusCode::BAD_REQUEST,
        body: ErrorBody {
            error: "Invalid JSON body".to_string(),
            details: Some(rejection.body_text()),
        },
    })?;

    let input = req
        .config
        .ok_or_else(|| ApiError::bad_request("Missing MCP server configuration"))?;

    let mut config = build_server_config(&input);
    if is_managed(&config.id) {
        config = ensure_managed_config(config).map_err(McpError::from)?;
    }

    let client = McpClient::new(config, state.cache.clone())?
        .with_http_client(state.http.clone())
        .with_options(state.config.mcp.call_options());

    let action = McpAction::parse(&req.action).ok_or_else(|| {
        ApiError::bad_request("Unsupported action. Use list_tools, invoke, or health.")
    })?;

    tracing::info!(
        name: "api.mcp.request",
        action = %req.action,
        server_id = %client.config().id,
        "MCP proxy request"
    );

    let body = match action {
        McpAction::ListTools => {
            let tools = client.list_tools().await.inspect_err(log_failure)?;
            let cached = state.cache.get(&client.config().id).is_some();
            json!({ "tools": tools.as_slice(), "cached": cached })
        }
        McpAction::Health => {
            let status = client.health().await;
            json!({ "status": status })
        }
        McpAction::Invoke => {
            let method = req
                .method
                .filter(|m| !m.is_empty())
                .ok_or_else(|| ApiError::bad_request("Missing method for invocation"))?;
            let result = client
                .call(&method, req.params.unwrap_or_default())
                .await
                .inspect_err(log_failure)?;
            json!({ "result": result })
        }
    };

    Ok(Json(body))
}

fn log_failure(e: &McpError) {
    if !e.is_invalid_input() {
        tracing::error!(name: "api.mcp.failed", error = %e, "MCP proxy request failed");
    }
}
