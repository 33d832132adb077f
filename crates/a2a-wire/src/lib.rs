//! # a2a-wire
//!
//! Wire-level client for the Agent-to-Agent (A2A) protocol, built for
//! inspection rather than happy-path use: agent cards come back as raw JSON,
//! and every JSON-RPC response is reduced to a closed success/error variant
//! without assuming the agent got the payload shape right.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use a2a_wire::{A2AClient, CardFetcher, CardResolver, JsonRpcRequest, Message, MessageSendParams, ProtocolTransport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let card = CardResolver::new(Duration::from_secs(30))?
//!         .fetch_card("https://agent.example.com")
//!         .await?;
//!     println!("Found: {}", card["name"]);
//!
//!     let client = A2AClient::new("https://agent.example.com/a2a")?;
//!     let params = MessageSendParams::new(Message::user_text("Summarize Q4 report"), vec!["text/plain".into()]);
//!     let request = JsonRpcRequest::message("req-1", &params, false)?;
//!     println!("{:?}", client.send(&request).await?);
//!     Ok(())
//! }
//! ```

pub mod agent_card;
pub mod client;
pub mod error;
pub mod message;
pub mod transport;

// Re-export primary types
pub use agent_card::{CardFetcher, CardResolver, AGENT_CARD_PATH, LEGACY_AGENT_CARD_PATH};
pub use client::A2AClient;
pub use error::{A2AError, A2AResult};
pub use message::{Message, MessageRole, MessageSendConfiguration, MessageSendParams, Part};
pub use transport::jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId, RpcOutcome};
pub use transport::sse::RpcOutcomeStream;
pub use transport::ProtocolTransport;
