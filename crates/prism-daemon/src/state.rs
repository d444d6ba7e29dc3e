//! Application state management

use prism_core::LogicalDevice;
use prism_discovery::{ControlSurface, DeviceEvent, DeviceReconciler, SnapshotSurface};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

use crate::config::Config;

/// Shared application state
pub struct AppState {
    /// Device reconciler
    pub reconciler: Arc<DeviceReconciler>,
    /// Configuration
    pub config: Config,
}

impl AppState {
    /// Create state backed by the configured topology snapshot
    pub fn new(config: Config) -> Arc<Self> {
        let surface = SnapshotSurface::new(&config.surface.snapshot_path, config.protocol_details());
        info!(snapshot = %surface.path().display(), "Using snapshot control surface");
        Self::with_surface(config, Arc::new(surface))
    }

    pub fn with_surface(config: Config, surface: Arc<dyn ControlSurface>) -> Arc<Self> {
        let reconciler = Arc::new(DeviceReconciler::new(
            surface,
            config.to_reconciler_config(),
        ));
        Arc::new(Self { reconciler, config })
    }

    /// Subscribe to reconciliation events
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.reconciler.subscribe()
    }

    pub async fn devices(&self) -> Vec<LogicalDevice> {
        self.reconciler.devices().await
    }

    pub async fn get_device(&self, name: &str) -> Option<LogicalDevice> {
        self.reconciler.device(name).await
    }
}
