//! Configuration loading and validation

use anyhow::Result;
use prism_core::{RgbOrder, SpecOverride};
use prism_discovery::{ProtocolDetails, ReconcilerConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub surface: SurfaceConfig,
    #[serde(default)]
    pub thumbnails: ThumbnailsConfig,
    #[serde(default, rename = "device_override")]
    pub device_overrides: Vec<SpecOverride>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Bind address for web server
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Seconds between reconciliation ticks
    #[serde(default = "default_interval")]
    pub reconcile_interval_secs: u64,
    /// Control priority requested after each handshake
    #[serde(default = "default_priority")]
    pub control_priority: u8,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            reconcile_interval_secs: default_interval(),
            control_priority: default_priority(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_interval() -> u64 {
    10
}

fn default_priority() -> u8 {
    127
}

/// File-backed control surface settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Topology snapshot replayed by the surface
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
    #[serde(default = "default_version")]
    pub sdk_version: String,
    #[serde(default = "default_server_version")]
    pub server_version: Option<String>,
    #[serde(default = "default_protocol")]
    pub sdk_protocol_version: i32,
    #[serde(default = "default_protocol")]
    pub server_protocol_version: i32,
    #[serde(default)]
    pub breaking_changes: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            sdk_version: default_version(),
            server_version: default_server_version(),
            sdk_protocol_version: default_protocol(),
            server_protocol_version: default_protocol(),
            breaking_changes: false,
        }
    }
}

fn default_snapshot_path() -> String {
    "./topology.toml".to_string()
}

fn default_version() -> String {
    "3.0.0".to_string()
}

fn default_server_version() -> Option<String> {
    Some(default_version())
}

fn default_protocol() -> i32 {
    3
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailsConfig {
    /// Directory holding `<key>.png` thumbnails
    #[serde(default = "default_thumbnails_path")]
    pub path: String,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            path: default_thumbnails_path(),
        }
    }
}

fn default_thumbnails_path() -> String {
    "./assets/thumbnails".to_string()
}

impl Config {
    /// Convert to ReconcilerConfig
    pub fn to_reconciler_config(&self) -> ReconcilerConfig {
        ReconcilerConfig {
            interval_secs: self.daemon.reconcile_interval_secs,
            control_priority: self.daemon.control_priority,
            overrides: self.device_overrides.clone(),
        }
    }

    /// Handshake answer the snapshot surface gives
    pub fn protocol_details(&self) -> ProtocolDetails {
        ProtocolDetails {
            sdk_version: self.surface.sdk_version.clone(),
            server_version: self.surface.server_version.clone(),
            sdk_protocol_version: self.surface.sdk_protocol_version,
            server_protocol_version: self.surface.server_protocol_version,
            breaking_changes: self.surface.breaking_changes,
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(
            path = %path.display(),
            overrides = config.device_overrides.len(),
            "Loaded configuration"
        );
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<()> {
    let config = Config {
        device_overrides: vec![SpecOverride {
            name: "QL Fan 2".to_string(),
            title: Some("Corsair Commander PRO".to_string()),
            channel: Some(1),
            led_count: 16,
            rgb_order: Some(RgbOrder::Grb),
            mapper: None,
        }],
        ..Config::default()
    };

    let content = toml::to_string_pretty(&config)?;
    std::fs::write(path, content)?;
    Ok(())
}
