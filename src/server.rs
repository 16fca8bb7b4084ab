use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::info;

use crate::bot::AppState;
use crate::event::{handle_local_body, handle_raw_event, EventResponse};

/// Build the HTTP surface. `/message_handler` only exists when `local` is set.
pub fn router(state: Arc<AppState>, local: bool) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/invoke", post(invoke));

    if local {
        info!("Local stage: enabling POST /message_handler");
        app = app.route("/message_handler", post(local_message_handler));
    }

    app.with_state(state)
}

pub async fn serve(state: Arc<AppState>, bind_address: &str, local: bool) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("Failed to bind to {bind_address}"))?;

    info!("Listening on http://{}", bind_address);

    axum::serve(listener, router(state, local))
        .await
        .context("Server error")?;

    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn invoke(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    into_response(handle_raw_event(&state, &body).await)
}

async fn local_message_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    match handle_local_body(&state, &body).await {
        Some(response) => into_response(response),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

fn into_response(response: EventResponse) -> Response {
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response)).into_response()
}
