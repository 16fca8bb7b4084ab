use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::bot::AppState;

/// Function-style invocation envelope: the update arrives JSON-encoded in `body`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventEnvelope {
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EventResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

impl EventResponse {
    pub const OK: Self = Self { status_code: 200 };
    pub const FAILED: Self = Self { status_code: 500 };
}

/// Entry point for one inbound event. Holds no state between calls.
pub async fn handle_event(state: &AppState, event: &EventEnvelope) -> EventResponse {
    match process_event(state, event).await {
        Ok(()) => EventResponse::OK,
        Err(e) => {
            error!("Failed to process event: {:#}", e);
            EventResponse::FAILED
        }
    }
}

async fn process_event(state: &AppState, event: &EventEnvelope) -> Result<()> {
    let body = event.body.as_deref().context("Event has no body")?;
    state.process_body(body).await
}

/// Entry point for a raw invocation payload.
///
/// An envelope that does not parse is a failed event, not a client error.
pub async fn handle_raw_event(state: &AppState, raw: &[u8]) -> EventResponse {
    match serde_json::from_slice::<EventEnvelope>(raw) {
        Ok(envelope) => handle_event(state, &envelope).await,
        Err(e) => {
            error!("Failed to parse event envelope: {}", e);
            EventResponse::FAILED
        }
    }
}

/// Local testing hook: wrap a raw update body into an envelope.
///
/// Returns `None` outside the `local` stage.
pub async fn handle_local_body(state: &AppState, raw_body: &[u8]) -> Option<EventResponse> {
    if !state.is_local() {
        warn!("Local message handler called outside the local stage, ignoring");
        return None;
    }

    let response = match serde_json::from_slice::<serde_json::Value>(raw_body) {
        Ok(json) => {
            let envelope = EventEnvelope {
                body: Some(json.to_string()),
            };
            handle_event(state, &envelope).await
        }
        Err(e) => {
            error!("Local request body is not valid JSON: {}", e);
            EventResponse::FAILED
        }
    };
    Some(response)
}
