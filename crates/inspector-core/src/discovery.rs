//! Agent card inspection: fetch, validate, and mirror the exchange.

use serde::Serialize;
use serde_json::{json, Value};

use a2a_wire::CardFetcher;

use crate::card_validator::validate_agent_card;
use crate::error::InspectorResult;
use crate::events::{DebugKind, DebugRecord, EventSink, InspectorEvent, CARD_CORRELATION_ID};

/// Endpoint name recorded in the diagnostic mirror.
pub const CARD_ENDPOINT: &str = "/agent-card";

/// A fetched card together with its validation results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardInspection {
    pub card: Value,
    pub validation_errors: Vec<String>,
}

impl CardInspection {
    pub fn is_valid(&self) -> bool {
        self.validation_errors.is_empty()
    }
}

/// Fetch the card of the agent at `agent_url` and validate it.
///
/// A `request` record is emitted before the fetch and a `response` record
/// after it, whether the fetch succeeded (status 200) or not (status 500).
pub async fn inspect_agent_card(
    fetcher: &dyn CardFetcher,
    agent_url: &str,
    session_id: Option<&str>,
    sink: &dyn EventSink,
) -> InspectorResult<CardInspection> {
    sink.emit(InspectorEvent::Debug(DebugRecord::new(
        DebugKind::Request,
        json!({
            "endpoint": CARD_ENDPOINT,
            "payload": {"url": agent_url, "sid": session_id},
        }),
        CARD_CORRELATION_ID,
    )));

    let outcome: InspectorResult<CardInspection> = match fetcher.fetch_card(agent_url).await {
        Ok(card) => {
            let validation_errors = validate_agent_card(&card);
            if !validation_errors.is_empty() {
                tracing::info!(
                    url = %agent_url,
                    violations = validation_errors.len(),
                    "Agent card failed validation"
                );
            }
            Ok(CardInspection {
                card,
                validation_errors,
            })
        }
        Err(e) => {
            tracing::error!(url = %agent_url, error = %e, "Agent card fetch failed");
            Err(e.into())
        }
    };

    let (status, payload) = match &outcome {
        Ok(inspection) => (200, serde_json::to_value(inspection).unwrap_or(Value::Null)),
        Err(e) => (
            500,
            json!({ "error": format!("An internal server error occurred: {e}") }),
        ),
    };
    sink.emit(InspectorEvent::Debug(DebugRecord::new(
        DebugKind::Response,
        json!({ "status": status, "payload": payload }),
        CARD_CORRELATION_ID,
    )));

    outcome
}
