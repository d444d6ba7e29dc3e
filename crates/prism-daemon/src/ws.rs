//! WebSocket handler for real-time updates

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use prism_core::LogicalDevice;
use prism_discovery::{DeviceEvent, ProtocolDetails};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::state::AppState;

/// WebSocket message types
#[derive(Serialize)]
#[serde(tag = "type", content = "data")]
enum WsMessage {
    #[serde(rename = "device_added")]
    DeviceAdded(LogicalDevice),
    #[serde(rename = "device_removed")]
    DeviceRemoved(LogicalDevice),
    #[serde(rename = "device_updated")]
    DeviceUpdated(LogicalDevice),
    #[serde(rename = "session_connected")]
    SessionConnected(ProtocolDetails),
    #[serde(rename = "session_lost")]
    SessionLost { reason: String },
    #[serde(rename = "control_priority_denied")]
    ControlPriorityDenied { level: u8 },
    #[serde(rename = "scan_started")]
    ScanStarted,
    #[serde(rename = "scan_completed")]
    ScanCompleted { found: usize, total: usize },
    #[serde(rename = "pong")]
    Pong,
}

impl From<DeviceEvent> for WsMessage {
    fn from(event: DeviceEvent) -> Self {
        match event {
            DeviceEvent::DeviceAdded(device) => WsMessage::DeviceAdded(device),
            DeviceEvent::DeviceRemoved(device) => WsMessage::DeviceRemoved(device),
            DeviceEvent::DeviceUpdated(device) => WsMessage::DeviceUpdated(device),
            DeviceEvent::SessionConnected(details) => WsMessage::SessionConnected(details),
            DeviceEvent::SessionLost { reason } => WsMessage::SessionLost { reason },
            DeviceEvent::ControlPriorityDenied { level } => {
                WsMessage::ControlPriorityDenied { level }
            }
            DeviceEvent::ScanStarted => WsMessage::ScanStarted,
            DeviceEvent::ScanCompleted { found, total } => {
                WsMessage::ScanCompleted { found, total }
            }
        }
    }
}

/// WebSocket upgrade handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = state.subscribe();

    info!("WebSocket client connected");

    // Send current device set on connect
    for device in state.devices().await {
        let msg = WsMessage::DeviceAdded(device);
        if let Ok(json) = serde_json::to_string(&msg) {
            if sender.send(Message::Text(json.into())).await.is_err() {
                return;
            }
        }
    }

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        let msg = WsMessage::from(event);
                        if let Ok(json) = serde_json::to_string(&msg) {
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(skipped = n, "Event channel lagged");
                    }
                    Err(e) => {
                        debug!(error = %e, "Event channel error");
                        break;
                    }
                }
            }

            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Text(text))) => {
                        if text.as_str() == "ping" {
                            if let Ok(pong) = serde_json::to_string(&WsMessage::Pong) {
                                if sender.send(Message::Text(pong.into())).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    info!("WebSocket client disconnected");
}
