//! Agent Card discovery.
//!
//! Every A2A-compatible agent publishes a self-describing card at
//! `/.well-known/agent-card.json` (older agents: `/.well-known/agent.json`).
//! The card is returned as raw JSON: the inspector validates what the agent
//! actually published instead of what a typed model would accept.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

use crate::client::header_pair;
use crate::error::{A2AError, A2AResult};

/// Current well-known card location.
pub const AGENT_CARD_PATH: &str = "/.well-known/agent-card.json";

/// Pre-1.0 well-known card location, tried when the current one is missing.
pub const LEGACY_AGENT_CARD_PATH: &str = "/.well-known/agent.json";

/// Something that can fetch an agent card document.
#[async_trait]
pub trait CardFetcher: Send + Sync {
    /// Fetch the card for the agent at `base_url`.
    async fn fetch_card(&self, base_url: &str) -> A2AResult<Value>;
}

/// Fetches agent cards over HTTP from the well-known endpoints.
#[derive(Debug, Clone)]
pub struct CardResolver {
    http: Client,
    headers: HeaderMap,
}

impl CardResolver {
    /// Create a resolver whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> A2AResult<Self> {
        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            headers: HeaderMap::new(),
        })
    }

    /// Attach custom headers to every card request.
    pub fn with_headers<'a, I>(mut self, headers: I) -> A2AResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (name, value) in headers {
            let (name, value) = header_pair(name, value)?;
            self.headers.insert(name, value);
        }
        Ok(self)
    }

    async fn get(&self, url: &str) -> A2AResult<Option<Value>> {
        let response = self
            .http
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|e| A2AError::DiscoveryFailed(format!("Failed to fetch agent card: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(A2AError::DiscoveryFailed(format!(
                "Agent card endpoint returned {}",
                response.status()
            )));
        }

        let card = response
            .json::<Value>()
            .await
            .map_err(|e| A2AError::InvalidAgentCard(format!("Failed to parse agent card: {e}")))?;
        Ok(Some(card))
    }
}

#[async_trait]
impl CardFetcher for CardResolver {
    async fn fetch_card(&self, base_url: &str) -> A2AResult<Value> {
        let base = base_url.trim_end_matches('/');

        for card_path in [AGENT_CARD_PATH, LEGACY_AGENT_CARD_PATH] {
            let url = format!("{base}{card_path}");
            tracing::info!(url = %url, "Discovering A2A agent");

            if let Some(card) = self.get(&url).await? {
                let name = card.get("name").and_then(Value::as_str).unwrap_or("<unnamed>");
                tracing::info!(url = %url, name = %name, "Discovered A2A agent");
                return Ok(card);
            }
        }

        Err(A2AError::DiscoveryFailed(format!(
            "No agent card found under {base}/.well-known/"
        )))
    }
}
