//! Response dispatcher: sends one chat message and normalizes whatever comes
//! back into outward events.
//!
//! A synchronous reply and a streamed reply go through the same
//! unwrap → validate → emit path: one `agent_response` per reply or per
//! stream chunk, each mirrored by a `debug_log` record. Nothing raised by the
//! transport escapes; it becomes a single error event instead.

use futures::StreamExt;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use a2a_wire::{
    A2AResult, JsonRpcRequest, Message, MessageSendParams, ProtocolTransport, RpcOutcome,
};

use crate::events::{AgentResponse, DebugKind, DebugRecord, EventSink, InspectorEvent};
use crate::message_validator::validate_message;
use crate::payload::str_at;

/// Output modes advertised when none are configured.
pub const DEFAULT_OUTPUT_MODES: [&str; 2] = ["text/plain", "video/mp4"];

/// Shown when an agent's error envelope has no message.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// One chat message to deliver.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    /// The text the user typed.
    pub text: String,

    /// Caller-chosen correlation id; generated when absent.
    pub correlation_id: Option<String>,

    /// Whether the agent declared `capabilities.streaming`.
    pub supports_streaming: bool,
}

impl OutboundMessage {
    pub fn new(text: impl Into<String>, supports_streaming: bool) -> Self {
        Self {
            text: text.into(),
            correlation_id: None,
            supports_streaming,
        }
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }
}

/// How a message was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    Synchronous,
    Streaming,
}

/// What happened while dispatching one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSummary {
    pub correlation_id: String,
    pub mode: DispatchMode,
    /// `agent_response` events carrying a payload.
    pub payloads: usize,
    /// `agent_response` events carrying an error.
    pub errors: usize,
    /// Stream consumption stopped because the sink closed.
    pub cancelled: bool,
}

impl DispatchSummary {
    fn new(correlation_id: String, mode: DispatchMode) -> Self {
        Self {
            correlation_id,
            mode,
            payloads: 0,
            errors: 0,
            cancelled: false,
        }
    }

    /// Total `agent_response` events emitted.
    pub fn events(&self) -> usize {
        self.payloads + self.errors
    }
}

/// Sends messages through a transport and reports results to a sink.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn ProtocolTransport>,
    sink: Arc<dyn EventSink>,
    accepted_output_modes: Vec<String>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn ProtocolTransport>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            transport,
            sink,
            accepted_output_modes: DEFAULT_OUTPUT_MODES.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Override `configuration.acceptedOutputModes` of outbound requests.
    pub fn with_accepted_output_modes(mut self, modes: Vec<String>) -> Self {
        self.accepted_output_modes = modes;
        self
    }

    /// Deliver one message and emit an event for every unit of response.
    ///
    /// Never fails: transport errors are logged and reported as one error
    /// event carrying the correlation id.
    pub async fn dispatch(&self, message: OutboundMessage) -> DispatchSummary {
        let correlation_id = message
            .correlation_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let mode = if message.supports_streaming {
            DispatchMode::Streaming
        } else {
            DispatchMode::Synchronous
        };
        let mut summary = DispatchSummary::new(correlation_id, mode);

        if let Err(e) = self.run(&message.text, &mut summary).await {
            tracing::error!(
                correlation_id = %summary.correlation_id,
                error = %e,
                "Failed to send message"
            );
            self.emit_response(
                AgentResponse::error(
                    format!("Failed to send message: {e}"),
                    summary.correlation_id.clone(),
                ),
                &mut summary,
            );
        }

        tracing::debug!(
            correlation_id = %summary.correlation_id,
            payloads = summary.payloads,
            errors = summary.errors,
            cancelled = summary.cancelled,
            "Dispatch finished"
        );
        summary
    }

    async fn run(&self, text: &str, summary: &mut DispatchSummary) -> A2AResult<()> {
        let streaming = summary.mode == DispatchMode::Streaming;
        let params = MessageSendParams::new(
            Message::user_text(text),
            self.accepted_output_modes.clone(),
        );
        let request = JsonRpcRequest::message(summary.correlation_id.clone(), &params, streaming)?;

        self.sink.emit(InspectorEvent::Debug(DebugRecord::new(
            DebugKind::Request,
            serde_json::to_value(&request)?,
            summary.correlation_id.clone(),
        )));

        match summary.mode {
            DispatchMode::Streaming => {
                // The stream lives only in this scope, so its connection is
                // released on completion, on error, and when this future is
                // dropped.
                let mut stream = self.transport.send_streaming(&request).await?;
                while let Some(item) = stream.next().await {
                    if self.sink.is_closed() {
                        tracing::info!(
                            correlation_id = %summary.correlation_id,
                            "Event sink closed, abandoning stream"
                        );
                        summary.cancelled = true;
                        break;
                    }
                    self.handle_outcome(item?, summary);
                }
            }
            DispatchMode::Synchronous => {
                let outcome = self.transport.send(&request).await?;
                self.handle_outcome(outcome, summary);
            }
        }
        Ok(())
    }

    fn handle_outcome(&self, outcome: RpcOutcome, summary: &mut DispatchSummary) {
        match outcome {
            RpcOutcome::Error { error, .. } => {
                let data = serde_json::to_value(&error).unwrap_or(Value::Null);
                self.sink.emit(InspectorEvent::Debug(DebugRecord::new(
                    DebugKind::Error,
                    data,
                    summary.correlation_id.clone(),
                )));

                let message = error.message.unwrap_or_else(|| UNKNOWN_ERROR.to_string());
                tracing::warn!(
                    correlation_id = %summary.correlation_id,
                    code = error.code,
                    message = %message,
                    "Agent returned an error envelope"
                );
                self.emit_response(
                    AgentResponse::error(message, summary.correlation_id.clone()),
                    summary,
                );
            }
            RpcOutcome::Success { result, .. } => {
                let response_id = str_at(&result, "id")
                    .map(str::to_owned)
                    .unwrap_or_else(|| summary.correlation_id.clone());
                let validation_errors = validate_message(&result);
                if !validation_errors.is_empty() {
                    tracing::debug!(
                        correlation_id = %summary.correlation_id,
                        violations = validation_errors.len(),
                        "Response failed validation"
                    );
                }

                let response = AgentResponse::payload(&result, response_id.clone(), validation_errors);
                self.sink.emit(InspectorEvent::Debug(DebugRecord::new(
                    DebugKind::Response,
                    response.to_value(),
                    response_id,
                )));
                self.emit_response(response, summary);
            }
        }
    }

    fn emit_response(&self, response: AgentResponse, summary: &mut DispatchSummary) {
        if response.is_error() {
            summary.errors += 1;
        } else {
            summary.payloads += 1;
        }
        self.sink.emit(InspectorEvent::Response(response));
    }
}
