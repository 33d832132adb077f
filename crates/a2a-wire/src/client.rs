//! A2A Client: HTTP transport to a single remote agent.
//!
//! The client posts JSON-RPC envelopes to the agent's RPC endpoint and hands
//! back unwrapped [`RpcOutcome`]s, either one at a time or as an SSE stream.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response};
use std::time::Duration;
use url::Url;

use crate::error::{A2AError, A2AResult};
use crate::transport::jsonrpc::{JsonRpcRequest, JsonRpcResponse, RpcOutcome};
use crate::transport::sse::{decode_sse, RpcOutcomeStream};
use crate::transport::ProtocolTransport;

const EVENT_STREAM: &str = "text/event-stream";

/// HTTP client for one remote agent's JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct A2AClient {
    /// Where JSON-RPC requests are posted.
    rpc_url: Url,

    /// HTTP client.
    http: Client,

    /// Extra headers attached to every request.
    headers: HeaderMap,
}

impl A2AClient {
    /// Create a client posting to `rpc_url` with a default HTTP client.
    pub fn new(rpc_url: &str) -> A2AResult<Self> {
        Self::with_http_client(rpc_url, Client::new())
    }

    /// Create a client with a request timeout.
    pub fn with_timeout(rpc_url: &str, timeout: Duration) -> A2AResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Self::with_http_client(rpc_url, http)
    }

    /// Create a client with a custom HTTP client.
    pub fn with_http_client(rpc_url: &str, http: Client) -> A2AResult<Self> {
        Ok(Self {
            rpc_url: Url::parse(rpc_url)?,
            http,
            headers: HeaderMap::new(),
        })
    }

    /// Attach a custom header to every request.
    pub fn with_header(mut self, name: &str, value: &str) -> A2AResult<Self> {
        let (name, value) = header_pair(name, value)?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Attach several custom headers.
    pub fn with_headers<'a, I>(self, headers: I) -> A2AResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        headers
            .into_iter()
            .try_fold(self, |client, (name, value)| client.with_header(name, value))
    }

    /// The endpoint requests are posted to.
    pub fn rpc_url(&self) -> &Url {
        &self.rpc_url
    }

    fn post(&self, request: &JsonRpcRequest, accept: &str) -> reqwest::RequestBuilder {
        self.http
            .post(self.rpc_url.clone())
            .headers(self.headers.clone())
            .header(ACCEPT, accept)
            .json(request)
    }
}

#[async_trait]
impl ProtocolTransport for A2AClient {
    async fn send(&self, request: &JsonRpcRequest) -> A2AResult<RpcOutcome> {
        tracing::debug!(
            method = %request.method,
            id = %request.id,
            url = %self.rpc_url,
            "Sending A2A request"
        );

        let response = self.post(request, "application/json").send().await?;
        read_single(response).await
    }

    async fn send_streaming(&self, request: &JsonRpcRequest) -> A2AResult<RpcOutcomeStream> {
        tracing::debug!(
            method = %request.method,
            id = %request.id,
            url = %self.rpc_url,
            "Sending streaming A2A request"
        );

        let response = self.post(request, EVENT_STREAM).send().await?;

        let is_event_stream = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with(EVENT_STREAM));

        if response.status().is_success() && is_event_stream {
            return Ok(decode_sse(response.bytes_stream()));
        }

        // Plain JSON answer to a streaming request: one-element stream.
        Ok(RpcOutcomeStream::once(read_single(response).await))
    }
}

/// Read a non-streamed body as one JSON-RPC response.
///
/// Non-2xx statuses are still decoded when the body is a JSON-RPC error
/// envelope, since that is how many agents report protocol errors.
async fn read_single(response: Response) -> A2AResult<RpcOutcome> {
    let status = response.status();
    let url = response.url().to_string();
    let body = response.text().await?;

    match JsonRpcResponse::parse(&body) {
        Ok(rpc) if status.is_success() || rpc.is_error() => rpc.into_outcome(),
        Ok(_) => Err(A2AError::HttpStatus {
            status: status.as_u16(),
            url,
        }),
        Err(_) if !status.is_success() => Err(A2AError::HttpStatus {
            status: status.as_u16(),
            url,
        }),
        Err(e) => Err(e),
    }
}

pub(crate) fn header_pair(name: &str, value: &str) -> A2AResult<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::from_bytes(name.trim().as_bytes())
        .map_err(|_| A2AError::InvalidHeader(name.to_string()))?;
    let header_value =
        HeaderValue::from_str(value).map_err(|_| A2AError::InvalidHeader(name.to_string()))?;
    Ok((header_name, header_value))
}
