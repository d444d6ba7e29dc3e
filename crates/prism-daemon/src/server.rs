//! Web server setup and routing

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::future::IntoFuture;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{error, info};

use crate::api;
use crate::state::AppState;
use crate::ws;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // API routes
        .route("/api/devices", get(api::list_devices))
        .route("/api/devices/{name}", get(api::get_device))
        .route("/api/devices/{name}/push", post(api::push_device))
        .route("/api/devices/{name}/pull", post(api::pull_device))
        .route("/api/session", get(api::get_session))
        .route("/api/scan", post(api::trigger_scan))
        .route("/api/resolve", get(api::resolve))
        .route("/api/config", get(api::get_config))
        // WebSocket for real-time updates
        .route("/ws", get(ws::websocket_handler))
        // Thumbnails by key
        .nest_service("/thumbnails", ServeDir::new(&state.config.thumbnails.path))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Serve the API while the reconciliation loop runs
///
/// Returns when the server fails or the loop hits a fatal error.
pub async fn run(state: Arc<AppState>, bind: &str) -> Result<()> {
    let app = router(state.clone());
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(address = %bind, protocol = "HTTP", "Starting web server");

    let reconciler = state.reconciler.clone();
    tokio::select! {
        result = axum::serve(listener, app).into_future() => {
            result?;
        }
        result = reconciler.run() => {
            if let Err(e) = result {
                error!(error = %e, "Device reconciler failed");
                return Err(e.into());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;

    const TOPOLOGY: &str = r#"
[[device]]
index = 0
device_type = "lightning_node_pro"
model = "Lighting Node PRO"

[[device.channel]]
index = 0

[[device.channel.sub_device]]
kind = "strip"
led_count = 10
"#;

    fn test_state(temp_dir: &TempDir) -> Arc<AppState> {
        let path = temp_dir.path().join("topology.toml");
        std::fs::write(&path, TOPOLOGY).unwrap();

        let mut config = Config::default();
        config.surface.snapshot_path = path.display().to_string();
        config.thumbnails.path = temp_dir.path().display().to_string();
        AppState::new(config)
    }

    async fn send(app: Router, method: &str, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_scan_then_list() {
        let temp_dir = TempDir::new().unwrap();
        let state = test_state(&temp_dir);

        let (status, json) = send(router(state.clone()), "GET", "/api/devices", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!([]));

        let (status, json) = send(router(state.clone()), "POST", "/api/scan", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "completed");
        assert_eq!(json["added"][0]["name"], "Internal LED Strip 1");

        let (status, json) = send(
            router(state.clone()),
            "GET",
            "/api/devices/Internal%20LED%20Strip%201",
            "",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["leds"].as_array().unwrap().len(), 10);

        let (status, json) = send(router(state), "GET", "/api/session", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["state"], "connected");
    }

    #[tokio::test]
    async fn test_push_and_pull() {
        let temp_dir = TempDir::new().unwrap();
        let state = test_state(&temp_dir);

        let (status, _) = send(
            router(state.clone()),
            "POST",
            "/api/devices/Internal%20LED%20Strip%201/pull",
            "",
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        send(router(state.clone()), "POST", "/api/scan", "").await;

        let (status, json) = send(
            router(state.clone()),
            "POST",
            "/api/devices/Internal%20LED%20Strip%201/push",
            r#"{"fill": {"r": 255, "g": 128, "b": 0}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["leds"][9]["color"]["g"], 128);

        let (status, json) = send(
            router(state.clone()),
            "POST",
            "/api/devices/Internal%20LED%20Strip%201/pull",
            "",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["leds"][0]["color"]["r"], 255);

        let (status, json) = send(router(state), "POST", "/api/devices/nope/pull", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json["error"].as_str().unwrap().contains("nope"));
    }

    #[tokio::test]
    async fn test_resolve_leaves_known_set() {
        let temp_dir = TempDir::new().unwrap();
        let state = test_state(&temp_dir);

        let (status, json) = send(router(state.clone()), "GET", "/api/resolve", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert!(state.devices().await.is_empty());
    }
}
