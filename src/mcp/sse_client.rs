use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::collections::HashMap;
use url::Url;

use crate::error::{McpError, TransportError, ValidationError};
use crate::mcp::sse::SseJsonReader;
use crate::mcp::transport::Transport;
use crate::mcp::types::{RpcRequest, resolve_payload};

/// HTTP transport whose response body is a server-sent-event stream.
///
/// The request is POSTed as JSON; the body is read incrementally and the
/// last JSON payload on the stream is taken as the response.
#[derive(Clone)]
pub struct SseTransport {
    http: reqwest::Client,
    url: Url,
    headers: HeaderMap,
    max_event_bytes: usize,
}

impl std::fmt::Debug for SseTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SseTransport")
            .field("url", &self.url.as_str())
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("max_event_bytes", &self.max_event_bytes)
            .finish()
    }
}

impl SseTransport {
    /// Build the transport, merging `headers` over the protocol defaults.
    ///
    /// Custom headers replace defaults of the same name and are marked
    /// sensitive so they stay out of debug output.
    pub fn new(
        http: reqwest::Client,
        url: Url,
        headers: &HashMap<String, String>,
        max_event_bytes: usize,
    ) -> Result<Self, ValidationError> {
        let mut map = HeaderMap::new();
        map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        map.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));

        for (name, value) in headers {
            let invalid = || ValidationError::InvalidHeader { name: name.clone() };
            let header_name = HeaderName::from_bytes(name.as_bytes()).ok().ok_or_else(invalid)?;
            let mut header_value = HeaderValue::from_str(value).ok().ok_or_else(invalid)?;
            header_value.set_sensitive(true);
            map.insert(header_name, header_value);
        }

        Ok(Self {
            http,
            url,
            headers: map,
            max_event_bytes,
        })
    }
}

#[async_trait]
impl Transport for SseTransport {
    async fn exchange(&self, request: &RpcRequest) -> Result<Value, McpError> {
        let body = serde_json::to_vec(request).map_err(TransportError::Encode)?;

        let resp = self
            .http
            .post(self.url.clone())
            .headers(self.headers.clone())
            .body(body)
            .send()
            .await
            .map_err(TransportError::Http)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".into());
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let mut reader = SseJsonReader::new(self.max_event_bytes);
        let byte_stream = resp.bytes_stream();
        futures::pin_mut!(byte_stream);
        while let Some(chunk) = byte_stream.next().await {
            let chunk = chunk.map_err(TransportError::Http)?;
            reader.push(&chunk)?;
        }

        let payload = reader.finish()?;
        resolve_payload(payload)
    }
}
