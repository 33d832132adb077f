//! Outward events: what the inspector reports back to whoever is watching.
//!
//! Two streams share one sink: the primary `agent_response` events and the
//! `debug_log` diagnostic mirror of raw requests, responses and errors.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Event name of diagnostic records.
pub const DEBUG_LOG: &str = "debug_log";
/// Event name of primary responses.
pub const AGENT_RESPONSE: &str = "agent_response";
/// Event name of session initialization results.
pub const CLIENT_INITIALIZED: &str = "client_initialized";

/// Correlation id used for the agent-card inspection flow.
pub const CARD_CORRELATION_ID: &str = "http-agent-card";

/// One event emitted by the inspector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InspectorEvent {
    Debug(DebugRecord),
    Response(AgentResponse),
    Initialized(ClientInitialized),
}

impl InspectorEvent {
    /// The event name this is delivered under.
    pub fn name(&self) -> &'static str {
        match self {
            InspectorEvent::Debug(_) => DEBUG_LOG,
            InspectorEvent::Response(_) => AGENT_RESPONSE,
            InspectorEvent::Initialized(_) => CLIENT_INITIALIZED,
        }
    }

    /// The correlation id tying this event to its request, if it has one.
    pub fn correlation_id(&self) -> Option<&str> {
        match self {
            InspectorEvent::Debug(record) => Some(&record.id),
            InspectorEvent::Response(response) => Some(response.id()),
            InspectorEvent::Initialized(_) => None,
        }
    }
}

// ── Diagnostic records ───────────────────────────────────────

/// What a diagnostic record mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DebugKind {
    Request,
    Response,
    Error,
}

/// A raw request, response or error snapshot kept for replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugRecord {
    #[serde(rename = "type")]
    pub kind: DebugKind,
    pub data: Value,
    pub id: String,
    pub timestamp: DateTime<Utc>,
}

impl DebugRecord {
    pub fn new(kind: DebugKind, data: Value, id: impl Into<String>) -> Self {
        Self {
            kind,
            data,
            id: id.into(),
            timestamp: Utc::now(),
        }
    }
}

// ── Agent responses ──────────────────────────────────────────

/// The uniform shape every unit of agent response is reduced to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AgentResponse {
    /// A payload that arrived intact, with its validation results.
    Payload {
        #[serde(flatten)]
        payload: Map<String, Value>,
        id: String,
        validation_errors: Vec<String>,
    },
    /// A protocol or transport failure.
    Error { error: String, id: String },
}

impl AgentResponse {
    /// Build a payload event. Any `id` inside the payload is lifted out so
    /// that the event carries exactly one.
    pub fn payload(payload: &Value, id: impl Into<String>, validation_errors: Vec<String>) -> Self {
        let mut payload = match payload {
            Value::Object(map) => map.clone(),
            other => {
                let mut map = Map::new();
                map.insert("result".into(), other.clone());
                map
            }
        };
        payload.remove("id");
        payload.remove("validation_errors");
        AgentResponse::Payload {
            payload,
            id: id.into(),
            validation_errors,
        }
    }

    pub fn error(error: impl Into<String>, id: impl Into<String>) -> Self {
        AgentResponse::Error {
            error: error.into(),
            id: id.into(),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            AgentResponse::Payload { id, .. } | AgentResponse::Error { id, .. } => id,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, AgentResponse::Error { .. })
    }

    /// The event as a single JSON object, as delivered to the front end.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Result of connecting a session to an agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClientInitialized {
    Success,
    Error { message: String },
}

// ── Sinks ────────────────────────────────────────────────────

/// Fire-and-forget receiver of inspector events.
pub trait EventSink: Send + Sync {
    /// Deliver an event. Never blocks and never reports failure.
    fn emit(&self, event: InspectorEvent);

    /// True once nobody is listening any more.
    fn is_closed(&self) -> bool {
        false
    }
}

/// Forwards events into an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<InspectorEvent>,
}

impl ChannelSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<InspectorEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: InspectorEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("event receiver dropped");
        }
    }

    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Keeps every event in memory, in order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<InspectorEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn events(&self) -> Vec<InspectorEvent> {
        self.events.lock().map(|events| events.to_vec()).unwrap_or_default()
    }

    /// Only the `agent_response` events.
    pub fn responses(&self) -> Vec<AgentResponse> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                InspectorEvent::Response(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    /// Only the diagnostic records.
    pub fn debug_records(&self) -> Vec<DebugRecord> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                InspectorEvent::Debug(r) => Some(r),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: InspectorEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_payload_event_shape() {
        let response = AgentResponse::payload(
            &json!({"kind": "task", "id": "task-1", "status": {"state": "working"}}),
            "task-1",
            vec![],
        );
        assert_eq!(
            response.to_value(),
            json!({
                "kind": "task",
                "status": {"state": "working"},
                "id": "task-1",
                "validation_errors": []
            })
        );
        assert!(!response.is_error());
    }

    #[test]
    fn test_error_event_shape() {
        let response = AgentResponse::error("boom", "corr-1");
        assert_eq!(response.to_value(), json!({"error": "boom", "id": "corr-1"}));
        assert_eq!(response.id(), "corr-1");
        assert!(response.is_error());
    }

    #[test]
    fn test_non_object_payload_is_wrapped() {
        let response = AgentResponse::payload(&json!("text"), "c", vec!["bad".into()]);
        assert_eq!(
            response.to_value(),
            json!({"result": "text", "id": "c", "validation_errors": ["bad"]})
        );
    }

    #[test]
    fn test_debug_record_shape() {
        let event = InspectorEvent::Debug(DebugRecord::new(
            DebugKind::Request,
            json!({"method": "message/send"}),
            "corr-1",
        ));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "request");
        assert_eq!(value["id"], "corr-1");
        assert_eq!(event.name(), DEBUG_LOG);
        assert_eq!(event.correlation_id(), Some("corr-1"));
    }

    #[test]
    fn test_client_initialized_shape() {
        assert_eq!(
            serde_json::to_value(ClientInitialized::Success).unwrap(),
            json!({"status": "success"})
        );
        assert_eq!(
            serde_json::to_value(ClientInitialized::Error { message: "nope".into() }).unwrap(),
            json!({"status": "error", "message": "nope"})
        );
    }

    #[tokio::test]
    async fn test_channel_sink_reports_closed() {
        let (sink, mut rx) = ChannelSink::channel();
        sink.emit(InspectorEvent::Response(AgentResponse::error("x", "1")));
        assert_eq!(rx.recv().await.map(|e| e.name()), Some(AGENT_RESPONSE));
        assert!(!sink.is_closed());

        drop(rx);
        assert!(sink.is_closed());
        sink.emit(InspectorEvent::Response(AgentResponse::error("y", "2")));
    }
}
