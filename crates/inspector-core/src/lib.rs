//! # a2a-inspector-core
//!
//! Core of the A2A inspector, a debugging console for Agent-to-Agent agents.
//!
//! This crate provides:
//! - Agent card and protocol message validation
//! - A dispatcher that turns one-shot replies and SSE streams into a single
//!   uniform `agent_response` event shape, mirrored by `debug_log` records
//! - Sessions that bind a connected agent to an event sink
//! - Configuration and tracing/OpenTelemetry setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use a2a_inspector_core::{ChannelSink, HttpConnector, InspectorConfig, SessionRegistry};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = InspectorConfig::load()?;
//!     let registry = SessionRegistry::new(
//!         Arc::new(HttpConnector::new(&config)),
//!         config.accepted_output_modes.clone(),
//!     );
//!
//!     let (sink, mut events) = ChannelSink::channel();
//!     registry.open("console", Arc::new(sink)).await;
//!     registry.initialize("console", "http://localhost:9999").await?;
//!     registry.send_message("console", "Hello!", None).await?;
//!
//!     while let Ok(event) = events.try_recv() {
//!         println!("{}: {}", event.name(), serde_json::to_string(&event)?);
//!     }
//!     Ok(())
//! }
//! ```

pub mod card_validator;
pub mod config;
pub mod discovery;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod message_validator;
pub mod payload;
pub mod session;
pub mod telemetry;

// Re-exports
pub use card_validator::{supports_streaming, validate_agent_card};
pub use config::{InspectorConfig, TelemetryConfig};
pub use discovery::{inspect_agent_card, CardInspection};
pub use dispatcher::{DispatchMode, DispatchSummary, Dispatcher, OutboundMessage};
pub use error::{InspectorError, InspectorResult};
pub use events::{
    AgentResponse, ChannelSink, ClientInitialized, DebugKind, DebugRecord, EventSink,
    InspectorEvent, MemorySink,
};
pub use message_validator::{classify, validate_message, Classification, MessageKind};
pub use payload::{lookup, Presence};
pub use session::{AgentConnection, AgentConnector, HttpConnector, SessionRegistry};
pub use telemetry::{init_telemetry, init_telemetry_with_filter};
