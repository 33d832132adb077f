//! SSE (Server-Sent Events) transport for A2A streaming.
//!
//! `message/stream` answers with an event stream whose `data` fields are
//! individual JSON-RPC responses.

use eventsource_stream::Eventsource;
use futures::future;
use futures::{Stream, StreamExt};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::error::{A2AError, A2AResult};
use crate::transport::jsonrpc::{JsonRpcResponse, RpcOutcome};

/// Sentinel some agents send as the final `data` line.
pub const DONE_SENTINEL: &str = "[DONE]";

type BoxedOutcomes = Pin<Box<dyn Stream<Item = A2AResult<RpcOutcome>> + Send>>;

// A stream of unwrapped JSON-RPC results. Dropping it releases the underlying
// HTTP connection.
pin_project! {
    pub struct RpcOutcomeStream {
        #[pin]
        inner: BoxedOutcomes,
    }
}

impl RpcOutcomeStream {
    /// Wrap an arbitrary outcome stream.
    pub fn new(inner: BoxedOutcomes) -> Self {
        Self { inner }
    }

    /// A stream that yields a single element and ends.
    pub fn once(item: A2AResult<RpcOutcome>) -> Self {
        Self::new(Box::pin(futures::stream::once(future::ready(item))))
    }

    /// A stream over pre-built items, in order.
    pub fn from_items(items: Vec<A2AResult<RpcOutcome>>) -> Self {
        Self::new(Box::pin(futures::stream::iter(items)))
    }
}

impl Stream for RpcOutcomeStream {
    type Item = A2AResult<RpcOutcome>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.project().inner.poll_next(cx)
    }
}

impl std::fmt::Debug for RpcOutcomeStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcOutcomeStream").finish_non_exhaustive()
    }
}

/// Decode an SSE byte stream into JSON-RPC outcomes.
///
/// Blank events are skipped and the stream ends at [`DONE_SENTINEL`]. A read
/// failure is yielded as an error item.
pub fn decode_sse<S, B, E>(bytes: S) -> RpcOutcomeStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let outcomes = bytes
        .eventsource()
        .take_while(|event| {
            future::ready(!matches!(event, Ok(e) if e.data.trim() == DONE_SENTINEL))
        })
        .filter_map(|event| {
            future::ready(match event {
                Ok(event) if event.data.trim().is_empty() => None,
                Ok(event) => Some(parse_sse_event(&event.data)),
                Err(e) => Some(Err(A2AError::StreamingError(format!(
                    "Stream read error: {e}"
                )))),
            })
        });

    RpcOutcomeStream::new(Box::pin(outcomes))
}

/// Parse one SSE `data` payload into an outcome.
pub fn parse_sse_event(data: &str) -> A2AResult<RpcOutcome> {
    let response: JsonRpcResponse = serde_json::from_str(data)
        .map_err(|e| A2AError::StreamingError(format!("Failed to parse SSE event: {e}")))?;
    response.into_outcome()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(parts: &[&str]) -> impl Stream<Item = Result<Vec<u8>, std::io::Error>> + Send {
        let owned: Vec<Result<Vec<u8>, std::io::Error>> =
            parts.iter().map(|p| Ok(p.as_bytes().to_vec())).collect();
        futures::stream::iter(owned)
    }

    #[tokio::test]
    async fn test_decodes_events_split_across_chunks() {
        let stream = decode_sse(chunks(&[
            "data: {\"jsonrpc\":\"2.0\",\"id\":\"1\",\"error\":{\"code\":-1,\"message\":\"boom\"}}\n\n",
            "data: {\"jsonrpc\":\"2.0\",\"id\":\"1\",",
            "\"result\":{\"kind\":\"status-update\",\"status\":{\"state\":\"working\"}}}\n\n",
        ]));
        let items: Vec<_> = stream.collect().await;

        assert_eq!(items.len(), 2);
        assert!(matches!(items[0], Ok(RpcOutcome::Error { .. })));
        match &items[1] {
            Ok(RpcOutcome::Success { result, .. }) => {
                assert_eq!(result["status"]["state"], "working")
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stops_at_done_sentinel() {
        let stream = decode_sse(chunks(&[
            ": keep-alive\n\n",
            "data: {\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{\"kind\":\"task\"}}\n\n",
            "data: [DONE]\n\n",
            "data: {\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{\"kind\":\"task\"}}\n\n",
        ]));
        let items: Vec<_> = stream.collect().await;
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_garbage_event_is_an_error_item() {
        let stream = decode_sse(chunks(&["data: not json\n\n"]));
        let items: Vec<_> = stream.collect().await;
        assert!(matches!(items[0], Err(A2AError::StreamingError(_))));
    }
}
