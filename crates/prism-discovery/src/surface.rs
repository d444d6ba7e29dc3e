//! Vendor control surface contract

use prism_core::{LedColor, RawDeviceDescriptor, RawLedPosition};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by the vendor control surface
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("Control server not found")]
    ServerNotFound,
    #[error("Exclusive control held by another client")]
    NoControl,
    #[error("Protocol handshake not performed")]
    ProtocolHandshakeMissing,
    #[error("Incompatible protocol version")]
    IncompatibleProtocol,
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("Transport error: {0}")]
    Transport(String),
}

impl SurfaceError {
    /// Map a vendor error code; `0` (success) maps to `None`
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => None,
            1 => Some(Self::ServerNotFound),
            2 => Some(Self::NoControl),
            3 => Some(Self::ProtocolHandshakeMissing),
            4 => Some(Self::IncompatibleProtocol),
            5 => Some(Self::InvalidArguments("rejected by control server".to_string())),
            other => Some(Self::Transport(format!("unknown error code {}", other))),
        }
    }
}

/// Result of the protocol handshake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolDetails {
    pub sdk_version: String,
    /// Absent when no control server answered
    pub server_version: Option<String>,
    pub sdk_protocol_version: i32,
    pub server_protocol_version: i32,
    /// Client and server protocols cannot talk to each other
    pub breaking_changes: bool,
}

/// Transport to the vendor control surface
///
/// All calls are synchronous. A hung call stalls whoever made it, including
/// the reconciliation loop.
pub trait ControlSurface: Send + Sync {
    /// Whether the controlling application is running
    fn is_controller_running(&self) -> bool;

    fn handshake(&self) -> Result<ProtocolDetails, SurfaceError>;

    /// Request exclusive control at `level`; false if denied
    fn set_control_priority(&self, level: u8) -> bool;

    fn enumerate_devices(&self) -> Result<Vec<RawDeviceDescriptor>, SurfaceError>;

    fn enumerate_led_positions(&self, device_index: usize)
        -> Result<Vec<RawLedPosition>, SurfaceError>;

    fn write_colors(
        &self,
        device_index: usize,
        colors: &[(i32, LedColor)],
    ) -> Result<(), SurfaceError>;

    /// Read current colours; results may come back in any order
    fn read_colors(
        &self,
        device_index: usize,
        addresses: &[i32],
    ) -> Result<Vec<(i32, LedColor)>, SurfaceError>;
}
