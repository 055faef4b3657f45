use axum::http::StatusCode;
use axum_test::TestServer;
use nexus_mcp::AppState;
use nexus_mcp::config::{AppConfig, LogSettings, McpSettings, ServerSettings};
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config() -> Arc<AppConfig> {
    Arc::new(AppConfig {
        server: ServerSettings {
            port: 0,
            host: "127.0.0.1".to_string(),
            body_limit_bytes: 64 * 1024,
        },
        mcp: McpSettings {
            call_timeout_secs: 5,
            schema_cache_ttl_secs: 45,
            max_sse_buffer_bytes: 1024 * 1024,
        },
        log: LogSettings { json: false },
    })
}

fn test_server() -> TestServer {
    let app = nexus_mcp::server::router(AppState::new(test_config()));
    TestServer::new(app).expect("test server")
}

#[tokio::test]
async fn test_get_returns_usage() {
    let server = test_server();
    let res = server.get("/api/mcp").await;
    res.assert_status_ok();
    let body: Value = res.json();
    assert!(body["message"].as_str().unwrap().contains("POST"));
}

#[tokio::test]
async fn test_invalid_json_is_bad_request() {
    let server = test_server();
    let res = server
        .post("/api/mcp")
        .text("{not json")
        .content_type("application/json")
        .await;
    res.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = res.json();
    assert_eq!(body["error"], "Invalid JSON body");
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn test_missing_config_is_bad_request() {
    let server = test_server();
    let res = server
        .post("/api/mcp")
        .json(&json!({"action": "list_tools"}))
        .await;
    res.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = res.json();
    assert_eq!(body["error"], "Missing MCP server configuration");
}

#[tokio::test]
async fn test_unsupported_action_is_bad_request() {
    let server = test_server();
    let res = server
        .post("/api/mcp")
        .json(&json!({"action": "delete", "config": {"id": "s1", "url": "http://localhost:1"}}))
        .await;
    res.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = res.json();
    assert_eq!(
        body["error"],
        "Unsupported action. Use list_tools, invoke, or health."
    );
}

#[tokio::test]
async fn test_invoke_without_method_is_bad_request() {
    let server = test_server();
    let res = server
        .post("/api/mcp")
        .json(&json!({"action": "invoke", "config": {"id": "s1", "url": "http://localhost:1"}}))
        .await;
    res.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = res.json();
    assert_eq!(body["error"], "Missing method for invocation");
}

#[tokio::test]
async fn test_missing_url_is_bad_request() {
    let server = test_server();
    let res = server
        .post("/api/mcp")
        .json(&json!({"action": "invoke", "method": "ping", "config": {"id": "s1"}}))
        .await;
    res.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = res.json();
    assert_eq!(body["error"], "HTTP transport requires a target URL");
}

#[tokio::test]
async fn test_health_never_fails_the_request() {
    let server = test_server();
    let res = server
        .post("/api/mcp")
        .json(&json!({"action": "health", "config": {"id": "down"}}))
        .await;
    res.assert_status_ok();
    let body: Value = res.json();
    assert_eq!(body["status"]["healthy"], false);
    assert_eq!(
        body["status"]["message"],
        "HTTP transport requires a target URL"
    );
    assert!(body["status"]["timestamp"].is_string());
}

#[tokio::test]
async fn test_remote_failure_is_server_error() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&upstream)
        .await;

    let server = test_server();
    let res = server
        .post("/api/mcp")
        .json(&json!({
            "action": "invoke",
            "method": "tools/call",
            "params": {"name": "echo"},
            "config": {"id": "s1", "url": upstream.uri()}
        }))
        .await;
    res.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json();
    assert!(body["error"].as_str().unwrap().contains("502"));
}

#[tokio::test]
async fn test_invoke_returns_result() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                b"data: {\"jsonrpc\":\"2.0\",\"id\":\"1\",\"result\":{\"echo\":\"hi\"}}\n\n".to_vec(),
                "text/event-stream",
            ),
        )
        .mount(&upstream)
        .await;

    let server = test_server();
    let res = server
        .post("/api/mcp")
        .json(&json!({
            "action": "invoke",
            "method": "tools/call",
            "params": {"name": "echo", "arguments": {"text": "hi"}},
            "config": {"id": "s1", "url": upstream.uri()}
        }))
        .await;
    res.assert_status_ok();
    let body: Value = res.json();
    assert_eq!(body["result"], json!({"echo": "hi"}));
}

#[tokio::test]
async fn test_list_tools_reports_cached() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            b"data: {\"result\":{\"tools\":[{\"id\":\"t1\",\"name\":\"echo\"}]}}\n\n".to_vec(),
            "text/event-stream",
        ))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = test_server();
    let request = json!({"action": "list_tools", "config": {"id": "s1", "url": upstream.uri()}});

    for _ in 0..2 {
        let res = server.post("/api/mcp").json(&request).await;
        res.assert_status_ok();
        let body: Value = res.json();
        assert_eq!(body["tools"], json!([{"id": "t1", "name": "echo"}]));
        assert_eq!(body["cached"], true);
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_list_tools_over_stdio_uses_static_fallback() {
    let server = test_server();
    let res = server
        .post("/api/mcp")
        .json(&json!({
            "action": "list_tools",
            "config": {
                "id": "local",
                "transport": "stdio",
                "command": "sh",
                "args": ["-c", "cat >/dev/null; echo '{\"result\":{}}'"],
                "tools": [{"id": "t1", "name": "echo", "description": "Echo text"}]
            }
        }))
        .await;
    res.assert_status_ok();
    let body: Value = res.json();
    assert_eq!(body["tools"][0]["name"], "echo");
    assert_eq!(body["tools"][0]["description"], "Echo text");
}

#[tokio::test]
async fn test_managed_server_without_secret_is_server_error() {
    // Only meaningful when the secret is absent from the test environment.
    if std::env::var("GOOGLE_MAPS_GROUNDING_API_KEY").is_ok() {
        return;
    }

    let server = test_server();
    let res = server
        .post("/api/mcp")
        .json(&json!({"action": "list_tools", "config": {"id": "google-maps-grounding"}}))
        .await;
    res.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json();
    assert_eq!(
        body["error"],
        "Missing GOOGLE_MAPS_GROUNDING_API_KEY environment variable"
    );
}
