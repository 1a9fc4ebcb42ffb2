//! `/ws` upgrade endpoint: validates and single-use-consumes the subscription
//! token, re-checks the bound capability key for revocation, then fans out
//! matching bus events as WS text frames until the client disconnects.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::Instrument;
use wsp_postgres::query::CapabilityKeyRepository;

use crate::error::{Error, Result};
use crate::events::Event;
use crate::state::AppState;
use crate::ws::token::{self, TokenPayload};

/// Tracing target for WS connection lifecycle events.
pub const TRACING_TARGET: &str = "wsp_server::ws";

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: String,
}

/// Validates the presented token, consumes its nonce, and re-checks the
/// bound capability key before handing off to the WebSocket protocol
/// upgrade. Every rejection here must resolve before any `101 Switching
/// Protocols` is sent, since a close frame sent after upgrade is not
/// visible to a client that only inspects the HTTP response.
pub async fn upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response> {
    let payload = token::verify(&query.token, &state.ws_secret)?;
    state.ws_nonces.consume(&payload.nonce)?;

    let mut conn = state.db.get_connection().await.map_err(Error::from)?;
    let key = conn
        .find_capability_key_by_hash(&payload.key_hash)
        .await
        .map_err(Error::from)?;

    match key {
        Some(key) if !key.is_revoked() => {}
        _ => return Err(Error::key_revoked()),
    }

    let span = tracing::info_span!(
        target: TRACING_TARGET,
        "ws_connection",
        workspace_id = %payload.workspace_id,
        key_tier = ?payload.key_tier,
    );

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, payload).instrument(span)))
}

async fn handle_socket(mut socket: WebSocket, state: AppState, payload: TokenPayload) {
    tracing::info!(target: TRACING_TARGET, "ws connection established");

    let allowed = token::allowed_events(payload.key_tier);
    let mut events = state.bus.subscribe();

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(err)) => {
                        tracing::warn!(target: TRACING_TARGET, error = %err, "ws recv error");
                        break;
                    }
                }
            }
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        if !event_visible(&event, &payload, &allowed) {
                            continue;
                        }
                        if send_event(&mut socket, &event).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(target: TRACING_TARGET, skipped, "ws subscriber lagged, dropping events");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::info!(target: TRACING_TARGET, "ws connection closed");
}

fn event_visible(event: &Event, payload: &TokenPayload, allowed: &[&'static str]) -> bool {
    if event.workspace_id != payload.workspace_id {
        return false;
    }

    if !allowed.contains(&event.event.as_str()) {
        return false;
    }

    match (&payload.scope, &event.path) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(scope), Some(path)) => {
            path == scope || path.strip_prefix(scope.as_str()).is_some_and(|rest| rest.starts_with('/'))
        }
    }
}

async fn send_event(socket: &mut WebSocket, event: &Event) -> Result<(), axum::Error> {
    let payload = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_owned());
    socket.send(Message::Text(payload.into())).await
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;
    use wsp_postgres::types::CapabilityPermission;

    use super::*;

    fn payload(scope: Option<&str>) -> TokenPayload {
        TokenPayload::new(
            Uuid::now_v7(),
            CapabilityPermission::Read,
            "hash".into(),
            scope.map(str::to_owned),
            jiff::Span::new().minutes(5),
        )
    }

    #[test]
    fn event_outside_workspace_is_invisible() {
        let p = payload(None);
        let event = Event::new(Uuid::now_v7(), "file.created", None, serde_json::Value::Null);
        assert!(!event_visible(&event, &p, &token::allowed_events(p.key_tier)));
    }

    #[test]
    fn event_outside_tier_is_invisible() {
        let p = payload(None);
        let event = Event::new(p.workspace_id, "settings.changed", None, serde_json::Value::Null);
        assert!(!event_visible(&event, &p, &token::allowed_events(p.key_tier)));
    }

    #[test]
    fn event_inside_scope_is_visible() {
        let p = payload(Some("/notes"));
        let event = Event::new(
            p.workspace_id,
            "file.updated",
            Some("/notes/a.md".into()),
            serde_json::Value::Null,
        );
        assert!(event_visible(&event, &p, &token::allowed_events(p.key_tier)));
    }

    #[test]
    fn event_outside_scope_is_invisible() {
        let p = payload(Some("/notes"));
        let event = Event::new(
            p.workspace_id,
            "file.updated",
            Some("/other/a.md".into()),
            serde_json::Value::Null,
        );
        assert!(!event_visible(&event, &p, &token::allowed_events(p.key_tier)));
    }
}
