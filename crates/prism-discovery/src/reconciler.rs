//! Device reconciler: session handling and the periodic resolve/diff loop

use chrono::{DateTime, Utc};
use prism_core::{resolve_devices, DeviceKey, LogicalDevice, RawDeviceDescriptor, SpecOverride};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::error::ReconcileError;
use crate::lighting::{pull_device, push_device, ColorUpdate};
use crate::surface::{ControlSurface, ProtocolDetails, SurfaceError};

/// Reconciler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Seconds between reconciliation ticks
    pub interval_secs: u64,
    /// Control priority requested after each handshake
    pub control_priority: u8,
    /// Caller spec overrides for channel products
    pub overrides: Vec<SpecOverride>,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            interval_secs: 10,
            control_priority: 127,
            overrides: Vec::new(),
        }
    }
}

/// Reconciliation event for real-time updates
#[derive(Debug, Clone)]
pub enum DeviceEvent {
    /// Device appeared in a scan
    DeviceAdded(LogicalDevice),
    /// Device missing from a scan, as it was last known
    DeviceRemoved(LogicalDevice),
    /// Device colours pushed or pulled
    DeviceUpdated(LogicalDevice),
    /// Handshake succeeded
    SessionConnected(ProtocolDetails),
    /// Session dropped after a control error
    SessionLost { reason: String },
    /// Exclusive control was refused; session continues shared
    ControlPriorityDenied { level: u8 },
    /// Scan started
    ScanStarted,
    /// Scan completed
    ScanCompleted { found: usize, total: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Disconnected,
    Connected,
}

/// Snapshot of the session with the control surface
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStatus {
    pub state: SessionState,
    pub protocol: Option<ProtocolDetails>,
    /// Whether the requested control priority was granted
    pub exclusive_control: bool,
    pub connected_since: Option<DateTime<Utc>>,
    pub last_scan: Option<DateTime<Utc>>,
}

/// What a single tick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Controlling application not running; nothing touched
    ControllerAbsent,
    /// Enumeration failed and the session was dropped
    Disconnected,
    Reconciled {
        added: Vec<DeviceKey>,
        removed: Vec<DeviceKey>,
    },
}

/// Keeps the known device set in sync with the control surface
pub struct DeviceReconciler {
    surface: Arc<dyn ControlSurface>,
    config: Arc<RwLock<ReconcilerConfig>>,
    /// Held for the duration of a tick
    tick_lock: Mutex<()>,
    status: RwLock<SessionStatus>,
    known: RwLock<Vec<LogicalDevice>>,
    event_tx: broadcast::Sender<DeviceEvent>,
}

impl DeviceReconciler {
    pub fn new(surface: Arc<dyn ControlSurface>, config: ReconcilerConfig) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            surface,
            config: Arc::new(RwLock::new(config)),
            tick_lock: Mutex::new(()),
            status: RwLock::new(SessionStatus::default()),
            known: RwLock::new(Vec::new()),
            event_tx,
        }
    }

    /// Subscribe to reconciliation events
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.event_tx.subscribe()
    }

    pub async fn get_config(&self) -> ReconcilerConfig {
        self.config.read().await.clone()
    }

    /// Replace the caller overrides used from the next tick on
    pub async fn set_overrides(&self, overrides: Vec<SpecOverride>) {
        let mut config = self.config.write().await;
        info!(count = overrides.len(), "Spec overrides updated");
        config.overrides = overrides;
    }

    pub async fn session_status(&self) -> SessionStatus {
        self.status.read().await.clone()
    }

    /// Current known device set
    pub async fn devices(&self) -> Vec<LogicalDevice> {
        self.known.read().await.clone()
    }

    /// Look up a known device by display name
    pub async fn device(&self, name: &str) -> Option<LogicalDevice> {
        self.known.read().await.iter().find(|d| d.name == name).cloned()
    }

    /// Resolve the current topology without touching the known set
    ///
    /// Connects first if needed.
    pub async fn get_devices(&self) -> Result<Vec<LogicalDevice>, ReconcileError> {
        let _guard = self.tick_lock.lock().await;

        if self.status.read().await.state == SessionState::Disconnected {
            self.connect().await?;
        }

        let raw = self.fetch_topology()?;
        let overrides = self.config.read().await.overrides.clone();
        Ok(resolve_devices(&raw, &overrides))
    }

    /// Run one reconciliation tick
    ///
    /// Ticks are serialized; a manual tick waits for a running one to finish.
    pub async fn tick(&self) -> Result<TickOutcome, ReconcileError> {
        let _guard = self.tick_lock.lock().await;

        if !self.surface.is_controller_running() {
            debug!("Controlling application not running, skipping tick");
            return Ok(TickOutcome::ControllerAbsent);
        }

        if self.status.read().await.state == SessionState::Disconnected {
            self.connect().await?;
        }

        let _ = self.event_tx.send(DeviceEvent::ScanStarted);

        let raw = match self.fetch_topology() {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Enumeration failed, dropping session");
                self.disconnect(e.to_string()).await;
                return Ok(TickOutcome::Disconnected);
            }
        };

        let overrides = self.config.read().await.overrides.clone();
        let resolved = resolve_devices(&raw, &overrides);
        let found = resolved.len();
        let (added, removed, total) = self.apply_scan(resolved).await;

        self.status.write().await.last_scan = Some(Utc::now());
        let _ = self.event_tx.send(DeviceEvent::ScanCompleted { found, total });

        info!(
            found = found,
            added = added.len(),
            removed = removed.len(),
            total = total,
            "Reconciliation complete"
        );

        Ok(TickOutcome::Reconciled { added, removed })
    }

    /// Run reconciliation until a fatal error occurs
    ///
    /// The first tick runs immediately.
    pub async fn run(&self) -> Result<(), ReconcileError> {
        let interval_secs = self.config.read().await.interval_secs.max(1);
        let mut ticker = interval(Duration::from_secs(interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(interval_secs = interval_secs, "Reconciliation loop started");

        loop {
            ticker.tick().await;

            match self.tick().await {
                Ok(outcome) => debug!(?outcome, "Tick finished"),
                Err(e) if e.is_fatal() => {
                    error!(error = %e, "Reconciliation loop stopped");
                    return Err(e);
                }
                Err(e) => warn!(error = %e, "Reconciliation tick failed"),
            }
        }
    }

    /// Apply a colour update to a known device and write it to the surface
    pub async fn push(
        &self,
        name: &str,
        update: &ColorUpdate,
    ) -> Result<LogicalDevice, ReconcileError> {
        self.require_connected().await?;

        let mut known = self.known.write().await;
        let device = known
            .iter_mut()
            .find(|d| d.name == name)
            .ok_or_else(|| ReconcileError::DeviceNotFound(name.to_string()))?;

        update.apply(device);
        let written = push_device(self.surface.as_ref(), device)?;
        debug!(device = %name, leds = written, "Colours pushed");

        let device = device.clone();
        let _ = self.event_tx.send(DeviceEvent::DeviceUpdated(device.clone()));
        Ok(device)
    }

    /// Read a known device's colours back from the surface
    pub async fn pull(&self, name: &str) -> Result<LogicalDevice, ReconcileError> {
        self.require_connected().await?;

        let mut known = self.known.write().await;
        let device = known
            .iter_mut()
            .find(|d| d.name == name)
            .ok_or_else(|| ReconcileError::DeviceNotFound(name.to_string()))?;

        let read = pull_device(self.surface.as_ref(), device)?;
        debug!(device = %name, leds = read, "Colours pulled");

        let device = device.clone();
        let _ = self.event_tx.send(DeviceEvent::DeviceUpdated(device.clone()));
        Ok(device)
    }

    async fn require_connected(&self) -> Result<(), ReconcileError> {
        match self.status.read().await.state {
            SessionState::Connected => Ok(()),
            SessionState::Disconnected => Err(ReconcileError::NotConnected),
        }
    }

    async fn connect(&self) -> Result<(), ReconcileError> {
        let details = match self.surface.handshake() {
            Ok(details) => details,
            Err(SurfaceError::IncompatibleProtocol) => return Err(ReconcileError::ProtocolRejected),
            Err(e) => return Err(ReconcileError::HandshakeFailure(e.to_string())),
        };

        if details.breaking_changes {
            return Err(ReconcileError::ProtocolIncompatible {
                sdk_protocol: details.sdk_protocol_version,
                server_protocol: details.server_protocol_version,
            });
        }

        if details.server_version.is_none() {
            return Err(ReconcileError::HandshakeFailure(
                SurfaceError::ServerNotFound.to_string(),
            ));
        }

        let level = self.config.read().await.control_priority;
        let exclusive = self.surface.set_control_priority(level);
        if !exclusive {
            let denied = ReconcileError::ControlPriorityDenied { level };
            warn!(error = %denied, "Continuing without exclusive control");
            let _ = self
                .event_tx
                .send(DeviceEvent::ControlPriorityDenied { level });
        }

        info!(
            sdk = %details.sdk_version,
            server = details.server_version.as_deref().unwrap_or_default(),
            protocol = details.server_protocol_version,
            exclusive = exclusive,
            "Session connected"
        );

        let mut status = self.status.write().await;
        status.state = SessionState::Connected;
        status.protocol = Some(details.clone());
        status.exclusive_control = exclusive;
        status.connected_since = Some(Utc::now());
        drop(status);

        let _ = self.event_tx.send(DeviceEvent::SessionConnected(details));
        Ok(())
    }

    async fn disconnect(&self, reason: String) {
        let mut status = self.status.write().await;
        status.state = SessionState::Disconnected;
        status.exclusive_control = false;
        status.connected_since = None;
        drop(status);

        info!(reason = %reason, "Session lost");
        let _ = self.event_tx.send(DeviceEvent::SessionLost { reason });
    }

    /// Enumerate devices and fill in LED positions for channel-less devices
    fn fetch_topology(&self) -> Result<Vec<RawDeviceDescriptor>, SurfaceError> {
        let mut devices = self.surface.enumerate_devices()?;
        for device in devices
            .iter_mut()
            .filter(|d| d.has_lighting() && d.channels.is_empty())
        {
            device.led_positions = self.surface.enumerate_led_positions(device.index)?;
        }
        Ok(devices)
    }

    /// Diff a fresh resolution against the known set by identity key
    ///
    /// Matching devices are left as they are, keeping their live colours.
    async fn apply_scan(
        &self,
        resolved: Vec<LogicalDevice>,
    ) -> (Vec<DeviceKey>, Vec<DeviceKey>, usize) {
        let mut known = self.known.write().await;

        let fresh: HashSet<DeviceKey> = resolved.iter().map(LogicalDevice::key).collect();
        let (kept, gone): (Vec<_>, Vec<_>) = known
            .drain(..)
            .partition(|device| fresh.contains(&device.key()));
        *known = kept;

        let existing: HashSet<DeviceKey> = known.iter().map(LogicalDevice::key).collect();
        let mut added = Vec::new();
        for device in resolved {
            let key = device.key();
            if existing.contains(&key) {
                continue;
            }
            info!(device = %key, leds = device.leds.len(), "Device added");
            known.push(device.clone());
            added.push(key);
            let _ = self.event_tx.send(DeviceEvent::DeviceAdded(device));
        }

        let mut removed = Vec::with_capacity(gone.len());
        for device in gone {
            let key = device.key();
            info!(device = %key, "Device removed");
            removed.push(key);
            let _ = self.event_tx.send(DeviceEvent::DeviceRemoved(device));
        }

        (added, removed, known.len())
    }
}
