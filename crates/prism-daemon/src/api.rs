//! REST API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use prism_discovery::{ColorUpdate, ReconcileError, TickOutcome};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::state::AppState;

/// API error response
#[derive(Serialize)]
struct ApiError {
    error: String,
}

impl ApiError {
    fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

fn error_response(e: ReconcileError) -> Response {
    let status = match &e {
        ReconcileError::DeviceNotFound(_) => StatusCode::NOT_FOUND,
        ReconcileError::NotConnected
        | ReconcileError::ProtocolIncompatible { .. }
        | ReconcileError::ProtocolRejected => {
            StatusCode::CONFLICT
        }
        _ => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(ApiError::new(e.to_string()))).into_response()
}

/// List the known device set
pub async fn list_devices(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.devices().await)
}

/// Get a specific device by display name
pub async fn get_device(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.get_device(&name).await {
        Some(device) => Json(device).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiError::new("Device not found")),
        )
            .into_response(),
    }
}

/// Apply colours to a device and write them out
pub async fn push_device(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(update): Json<ColorUpdate>,
) -> impl IntoResponse {
    match state.reconciler.push(&name, &update).await {
        Ok(device) => Json(device).into_response(),
        Err(e) => {
            warn!(device = %name, error = %e, "Push failed");
            error_response(e)
        }
    }
}

/// Read a device's colours back
pub async fn pull_device(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.reconciler.pull(&name).await {
        Ok(device) => Json(device).into_response(),
        Err(e) => {
            warn!(device = %name, error = %e, "Pull failed");
            error_response(e)
        }
    }
}

/// Session state and protocol details
pub async fn get_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.reconciler.session_status().await)
}

/// Run one reconciliation tick now
pub async fn trigger_scan(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    info!("Manual scan triggered");

    match state.reconciler.tick().await {
        Ok(TickOutcome::ControllerAbsent) => Json(serde_json::json!({
            "status": "controller_absent"
        }))
        .into_response(),
        Ok(TickOutcome::Disconnected) => Json(serde_json::json!({
            "status": "disconnected"
        }))
        .into_response(),
        Ok(TickOutcome::Reconciled { added, removed }) => Json(serde_json::json!({
            "status": "completed",
            "added": added,
            "removed": removed,
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}

/// Resolve the current topology without touching the known set
pub async fn resolve(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.reconciler.get_devices().await {
        Ok(devices) => Json(devices).into_response(),
        Err(e) => error_response(e),
    }
}

/// Current configuration
pub async fn get_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.config.clone())
}
