//! File-backed control surface
//!
//! Replays a recorded topology snapshot. The file is re-read on every
//! enumeration so editing it simulates hot-plugging, and deleting it looks
//! like the controlling application exiting. Colours live in memory.

use prism_core::{LedColor, RawDeviceDescriptor, RawLedPosition, TopologySnapshot};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

use crate::surface::{ControlSurface, ProtocolDetails, SurfaceError};

pub struct SnapshotSurface {
    path: PathBuf,
    details: ProtocolDetails,
    priority: Mutex<Option<u8>>,
    colors: Mutex<HashMap<(usize, i32), LedColor>>,
}

impl SnapshotSurface {
    pub fn new(path: impl Into<PathBuf>, details: ProtocolDetails) -> Self {
        Self {
            path: path.into(),
            details,
            priority: Mutex::new(None),
            colors: Mutex::new(HashMap::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Control priority granted so far, if any
    pub fn priority(&self) -> Option<u8> {
        *self.priority.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load(&self) -> Result<TopologySnapshot, SurfaceError> {
        TopologySnapshot::from_file(&self.path)
            .map_err(|e| SurfaceError::Transport(format!("{}: {}", self.path.display(), e)))
    }
}

impl ControlSurface for SnapshotSurface {
    fn is_controller_running(&self) -> bool {
        self.path.exists()
    }

    fn handshake(&self) -> Result<ProtocolDetails, SurfaceError> {
        if !self.path.exists() {
            return Err(SurfaceError::ServerNotFound);
        }
        Ok(self.details.clone())
    }

    fn set_control_priority(&self, level: u8) -> bool {
        *self.priority.lock().unwrap_or_else(PoisonError::into_inner) = Some(level);
        info!(level = level, path = %self.path.display(), "Control priority granted");
        true
    }

    fn enumerate_devices(&self) -> Result<Vec<RawDeviceDescriptor>, SurfaceError> {
        let snapshot = self.load()?;
        debug!(
            path = %self.path.display(),
            devices = snapshot.devices.len(),
            "Loaded topology snapshot"
        );
        Ok(snapshot.devices)
    }

    fn enumerate_led_positions(
        &self,
        device_index: usize,
    ) -> Result<Vec<RawLedPosition>, SurfaceError> {
        self.load()?
            .devices
            .into_iter()
            .find(|d| d.index == device_index)
            .map(|d| d.led_positions)
            .ok_or_else(|| {
                SurfaceError::InvalidArguments(format!("no device at index {}", device_index))
            })
    }

    fn write_colors(
        &self,
        device_index: usize,
        colors: &[(i32, LedColor)],
    ) -> Result<(), SurfaceError> {
        let mut stored = self.colors.lock().unwrap_or_else(PoisonError::into_inner);
        for &(address, color) in colors {
            stored.insert((device_index, address), color);
        }
        Ok(())
    }

    /// Unwritten LEDs read back as black
    fn read_colors(
        &self,
        device_index: usize,
        addresses: &[i32],
    ) -> Result<Vec<(i32, LedColor)>, SurfaceError> {
        let stored = self.colors.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(addresses
            .iter()
            .map(|&address| {
                let color = stored
                    .get(&(device_index, address))
                    .copied()
                    .unwrap_or(LedColor::BLACK);
                (address, color)
            })
            .collect())
    }
}
