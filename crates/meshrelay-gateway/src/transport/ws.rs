//! WebSocket event stream (`GET /v1/events`).
//!
//! Responsibilities:
//! - Upgrade HTTP -> WS and subscribe to the event broadcast
//! - Forward JSON events; a slow subscriber skips what it missed
//! - Lifecycle: ping every `ping_interval_ms`, close after `idle_timeout_ms`
//!   without client traffic, close when the gateway starts draining

use axum::{
    extract::{ws::Message, ws::WebSocket, ws::WebSocketUpgrade, State},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{Duration, Instant};

use crate::app_state::AppState;
use crate::transport::codec::{sys_error_json, sys_lagged_json};

pub async fn events_upgrade(State(app): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| async move {
        app.metrics().ws_sessions_active.inc(&[]);
        run_session(&app, socket).await;
        app.metrics().ws_sessions_active.dec(&[]);
    })
}

async fn run_session(app: &AppState, socket: WebSocket) {
    let mut events = app.broadcast().subscribe();
    let (mut ws_tx, mut ws_rx) = socket.split();

    let gw = &app.cfg().gateway;
    let idle_timeout = Duration::from_millis(gw.idle_timeout_ms);
    let mut ping_tick = tokio::time::interval(Duration::from_millis(gw.ping_interval_ms));
    ping_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut watchdog = tokio::time::interval(Duration::from_millis(250));

    let mut last_activity = Instant::now();
    tracing::debug!("event subscriber connected");

    loop {
        tokio::select! {
            ev = events.recv() => {
                match ev {
                    Ok(json) => {
                        if ws_tx.send(Message::Text(json.to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "event subscriber lagged");
                        if ws_tx.send(Message::Text(sys_lagged_json(skipped))).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            incoming = ws_rx.next() => {
                let Some(Ok(msg)) = incoming else { break; };
                last_activity = Instant::now();
                match msg {
                    Message::Ping(payload) => {
                        if ws_tx.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Message::Close(_) => break,
                    // The stream is one-way; client frames only count as liveness.
                    _ => {}
                }
            }

            _ = ping_tick.tick() => {
                if ws_tx.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }

            _ = watchdog.tick() => {
                if app.is_draining() {
                    let _ = ws_tx.send(Message::Text(sys_error_json("DRAINING", "gateway is shutting down"))).await;
                    break;
                }
                if last_activity.elapsed() >= idle_timeout {
                    let _ = ws_tx.send(Message::Text(sys_error_json("TIMEOUT", "idle timeout"))).await;
                    break;
                }
            }
        }
    }

    let _ = ws_tx.send(Message::Close(None)).await;
    tracing::debug!("event subscriber disconnected");
}
