//! Admin realtime event stream
//!
//! `GET /admin/events?token=<admin jwt>` upgrades to a WebSocket that relays
//! every booking event published to the broadcast sink as a JSON text frame.
//! Browsers cannot set headers on a WebSocket handshake, so the token rides
//! in the query string and is checked before the upgrade.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use serde::Deserialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::extract::ApiQuery;
use crate::middleware::resolve_admin;
use crate::AppState;

static ACTIVE_CONNECTIONS: AtomicUsize = AtomicUsize::new(0);

const MAX_CONNECTIONS: usize = 200;

const PING_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
pub struct EventStreamQuery {
    pub token: Option<String>,
}

/// A reserved stream slot, released on drop
struct ConnectionSlot;

impl ConnectionSlot {
    fn reserve(limit: usize) -> Option<Self> {
        let previous = ACTIVE_CONNECTIONS.fetch_add(1, Ordering::AcqRel);
        let slot = ConnectionSlot;
        (previous < limit).then_some(slot)
    }

    fn active() -> usize {
        ACTIVE_CONNECTIONS.load(Ordering::Acquire)
    }
}

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        ACTIVE_CONNECTIONS.fetch_sub(1, Ordering::AcqRel);
    }
}

/// GET /admin/events
pub async fn admin_events(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EventStreamQuery>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> AppResult<Response> {
    let token = query
        .token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing token".to_string()))?;
    let admin = resolve_admin(&state, token).await?;

    let ws = ws.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let Some(slot) = ConnectionSlot::reserve(MAX_CONNECTIONS) else {
        warn!(
            current_connections = ConnectionSlot::active(),
            "Admin event stream limit exceeded"
        );
        return Err(AppError::ServiceUnavailable(
            "Too many connections, please try again later".to_string(),
        ));
    };

    let rx = state.events.subscribe();
    Ok(ws.on_upgrade(move |socket| relay_events(socket, rx, admin.id, slot)))
}

async fn relay_events(
    mut socket: WebSocket,
    mut rx: broadcast::Receiver<Arc<str>>,
    admin_id: Uuid,
    slot: ConnectionSlot,
) {
    info!(%admin_id, active_connections = ConnectionSlot::active(), "Admin event stream opened");

    let mut ping = interval(Duration::from_secs(PING_INTERVAL_SECS));

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(payload) => {
                    if socket.send(Message::Text(payload.to_string())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(%admin_id, skipped, "Admin event stream lagging, events dropped");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(%admin_id, error = %e, "Admin event stream receive error");
                    break;
                }
            },
            _ = ping.tick() => {
                if socket.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    drop(slot);
    info!(%admin_id, active_connections = ConnectionSlot::active(), "Admin event stream closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_are_capped_and_released() {
        let base = ConnectionSlot::active();
        let first = ConnectionSlot::reserve(base + 1).unwrap();
        assert!(ConnectionSlot::reserve(base + 1).is_none());
        assert_eq!(ConnectionSlot::active(), base + 1);

        drop(first);
        assert_eq!(ConnectionSlot::active(), base);
        assert!(ConnectionSlot::reserve(base + 1).is_some());
        assert_eq!(ConnectionSlot::active(), base);
    }
}
