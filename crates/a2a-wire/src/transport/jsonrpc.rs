//! JSON-RPC 2.0 transport binding for A2A.
//!
//! Every A2A operation is a JSON-RPC 2.0 request over HTTP(S). Responses are
//! reduced to [`RpcOutcome`], a closed success/error variant, before anything
//! downstream looks at them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{A2AError, A2AResult};
use crate::message::MessageSendParams;

/// JSON-RPC 2.0 protocol version.
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard A2A JSON-RPC method names.
pub mod methods {
    /// Send a message to the agent (creates or continues a task).
    pub const SEND_MESSAGE: &str = "message/send";

    /// Send a streaming message (returns an SSE stream).
    pub const SEND_STREAMING_MESSAGE: &str = "message/stream";
}

// ── JSON-RPC Request ─────────────────────────────────────────

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Must be "2.0".
    pub jsonrpc: String,

    /// Request identifier (used to match response).
    pub id: RequestId,

    /// The method to invoke.
    pub method: String,

    /// Method parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC request.
    pub fn new(id: RequestId, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            id,
            method: method.into(),
            params,
        }
    }

    /// Build a `message/send` or `message/stream` request.
    ///
    /// Both modes share the same envelope; only the method name differs.
    pub fn message(
        id: impl Into<String>,
        params: &MessageSendParams,
        streaming: bool,
    ) -> A2AResult<Self> {
        let method = if streaming {
            methods::SEND_STREAMING_MESSAGE
        } else {
            methods::SEND_MESSAGE
        };
        Ok(Self::new(
            RequestId::String(id.into()),
            method,
            Some(serde_json::to_value(params)?),
        ))
    }

    /// Whether this request expects an SSE stream back.
    pub fn is_streaming(&self) -> bool {
        self.method == methods::SEND_STREAMING_MESSAGE
    }
}

// ── JSON-RPC Response ────────────────────────────────────────

/// A JSON-RPC 2.0 response as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Must be "2.0".
    #[serde(default)]
    pub jsonrpc: String,

    /// The result (mutually exclusive with error).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// The error (mutually exclusive with result).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,

    /// The request identifier; `null` when the server could not parse the request.
    #[serde(default)]
    pub id: Option<RequestId>,
}

impl JsonRpcResponse {
    /// Decode a response body.
    pub fn parse(body: &str) -> A2AResult<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Check if this is an error response.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Reduce the envelope to its closed success/error form.
    pub fn into_outcome(self) -> A2AResult<RpcOutcome> {
        match (self.error, self.result) {
            (Some(error), _) => Ok(RpcOutcome::Error { id: self.id, error }),
            (None, Some(result)) => Ok(RpcOutcome::Success { id: self.id, result }),
            (None, None) => Err(A2AError::MalformedEnvelope(
                "response has neither 'result' nor 'error'".into(),
            )),
        }
    }
}

/// One unwrapped transport result: a successful payload or an error envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcOutcome {
    /// The agent returned a result payload.
    Success {
        id: Option<RequestId>,
        result: Value,
    },
    /// The agent returned a JSON-RPC error.
    Error {
        id: Option<RequestId>,
        error: JsonRpcError,
    },
}

// ── JSON-RPC Error ───────────────────────────────────────────

/// A JSON-RPC 2.0 error object.
///
/// Decoded leniently: agents under inspection do not always send a `message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    #[serde(default)]
    pub code: i64,

    /// Human-readable error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Optional additional data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(message) => write!(f, "JSON-RPC error {}: {}", self.code, message),
            None => write!(f, "JSON-RPC error {}", self.code),
        }
    }
}

impl std::error::Error for JsonRpcError {}

// ── Request ID ───────────────────────────────────────────────

/// JSON-RPC request identifier (can be a number or string).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestId::Number(n) => write!(f, "{n}"),
            RequestId::String(s) => f.write_str(s),
        }
    }
}
