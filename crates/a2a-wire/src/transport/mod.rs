//! Transport layer: wire-level protocol bindings for A2A.
//!
//! - JSON-RPC 2.0 over HTTP for one-shot calls
//! - SSE (Server-Sent Events) for streamed calls

pub mod jsonrpc;
pub mod sse;

use async_trait::async_trait;

use crate::error::A2AResult;
use jsonrpc::{JsonRpcRequest, RpcOutcome};
use sse::RpcOutcomeStream;

/// Something that can carry a JSON-RPC request to an agent.
///
/// Implemented by [`crate::A2AClient`] for HTTP; tests substitute scripted
/// transports.
#[async_trait]
pub trait ProtocolTransport: Send + Sync {
    /// Send a request and wait for its single result.
    async fn send(&self, request: &JsonRpcRequest) -> A2AResult<RpcOutcome>;

    /// Send a request and open the stream of results it produces.
    async fn send_streaming(&self, request: &JsonRpcRequest) -> A2AResult<RpcOutcomeStream>;
}
