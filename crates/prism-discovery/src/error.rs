use thiserror::Error;

use crate::surface::SurfaceError;

#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Handshake did not produce a usable session; retried next tick
    #[error("Handshake failed: {0}")]
    HandshakeFailure(String),
    /// Client and server protocols are incompatible
    #[error("Protocol incompatible (sdk protocol {sdk_protocol}, server protocol {server_protocol})")]
    ProtocolIncompatible {
        sdk_protocol: i32,
        server_protocol: i32,
    },
    /// Server refused the handshake outright, without reporting versions
    #[error("Protocol rejected by the control surface")]
    ProtocolRejected,
    #[error("Control priority {level} denied")]
    ControlPriorityDenied { level: u8 },
    #[error("Device not found: {0}")]
    DeviceNotFound(String),
    #[error("No session with the control surface")]
    NotConnected,
    #[error("Control surface error: {0}")]
    Surface(#[from] SurfaceError),
}

impl ReconcileError {
    /// Fatal errors stop the reconciliation loop
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ReconcileError::ProtocolIncompatible { .. } | ReconcileError::ProtocolRejected
        )
    }
}
