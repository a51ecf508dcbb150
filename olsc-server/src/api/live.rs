use axum::{
    extract::{
        Path, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use olsc_core::events::MatchChanged;
use olsc_core::store::StoreError;
use olsc_sdk::objects::{ClockSnapshot, MatchStateSnapshot, WsCloseCode, WsServerMessage};
use time::OffsetDateTime;

use crate::state::AppState;

/// `GET /matches/{match_id}/live` — WebSocket live state stream.
///
/// Upgrades the HTTP connection to a WebSocket and pushes a
/// [`WsServerMessage::StateUpdate`] frame with the full match state
/// (clock plus ordered event log) immediately, then again on every
/// change. The stream stays open after the match finishes so late
/// viewers still get the final state; it closes when the client
/// disconnects.
pub(super) async fn live_ws(
    state: State<AppState>,
    Path(match_id): Path<String>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let app_state = state.0.clone();
    ws.on_upgrade(move |socket| handle_live_ws(socket, app_state, match_id))
}

/// Background task that drives a single WebSocket connection.
///
/// 1. Subscribes to the change bus, then sends the current full state
///    as the first message. Subscribing first means an update racing
///    with the initial read is still captured in the receiver's buffer.
/// 2. Re-reads and forwards the full state on every change for this
///    `match_id` until the client disconnects.
async fn handle_live_ws(mut socket: WebSocket, state: AppState, match_id: String) {
    let mut broadcast_rx = state.bus.subscribe();

    // --- Send current state as the first message ---------------------------
    match full_state(&state, &match_id) {
        Ok(snapshot) => {
            let msg = WsServerMessage::StateUpdate { state: snapshot };
            if send_json(&mut socket, &msg).await.is_err() {
                return;
            }
        }
        Err(e) => {
            tracing::error!(error = %e, %match_id, "WS: failed to read match state");
            let _ = send_json(
                &mut socket,
                &WsServerMessage::Error {
                    code: WsCloseCode::INTERNAL_ERROR,
                    reason: "internal error".into(),
                },
            )
            .await;
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code: WsCloseCode::INTERNAL_ERROR,
                    reason: "internal error".into(),
                })))
                .await;
            return;
        }
    }

    // --- Relay updates until the client disconnects ------------------------

    loop {
        tokio::select! {
            result = broadcast_rx.recv() => {
                match result {
                    Ok(changed) if changed.match_id == match_id => {
                        if push_current_state(&mut socket, &state, &match_id).await.is_err() {
                            return;
                        }
                    }
                    Ok(_) => {
                        continue;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(
                            %match_id,
                            skipped = n,
                            "WS: broadcast receiver lagged, pushing current state"
                        );
                        if push_current_state(&mut socket, &state, &match_id).await.is_err() {
                            return;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }

            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        return;
                    }
                    Some(Ok(_)) => {
                    }
                    Some(Err(_)) => {
                        return;
                    }
                }
            }
        }
    }

    let _ = socket.send(Message::Close(None)).await;
}

/// Read and push the current full state. `Err` means the connection is
/// done (client gone or store failure already signalled).
async fn push_current_state(
    socket: &mut WebSocket,
    state: &AppState,
    match_id: &str,
) -> Result<(), ()> {
    let snapshot = match full_state(state, match_id) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::error!(error = %e, %match_id, "WS: failed to read match state on update");
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code: WsCloseCode::INTERNAL_ERROR,
                    reason: "internal error".into(),
                })))
                .await;
            return Err(());
        }
    };
    send_json(socket, &WsServerMessage::StateUpdate { state: snapshot }).await
}

/// Assemble the full state for one match.
///
/// Applies the clock ceiling like the HTTP read path does, so a viewer
/// connecting to a long-abandoned match sees it auto-stopped.
fn full_state(state: &AppState, match_id: &str) -> Result<MatchStateSnapshot, StoreError> {
    let (clock, auto_stopped) = state.clocks.mutate(match_id, |slot| match slot.as_mut() {
        None => (ClockSnapshot::absent(match_id), false),
        Some(clock) => {
            let now = OffsetDateTime::now_utc();
            let before = clock.clone();
            clock.apply_ceiling(now);
            (clock.snapshot(now), *clock != before)
        }
    })?;
    if auto_stopped {
        state.bus.publish(MatchChanged::clock(match_id));
    }

    let events = state
        .feeds
        .get(match_id)?
        .map(|feed| feed.events().to_vec())
        .unwrap_or_default();

    Ok(MatchStateSnapshot {
        match_id: match_id.to_string(),
        clock,
        events,
    })
}

/// Serialize `value` as JSON and send it as a text WebSocket frame.
///
/// Returns `Err(())` if the send fails (client disconnected).
async fn send_json<T: serde::Serialize>(socket: &mut WebSocket, value: &T) -> Result<(), ()> {
    let json = serde_json::to_string(value).map_err(|_| ())?;
    socket
        .send(Message::Text(json.into()))
        .await
        .map_err(|_| ())
}
