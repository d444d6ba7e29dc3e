//! Prism Discovery - Keeping the logical device set in sync with the hardware
//!
//! This crate provides:
//! - The control surface contract the vendor transport implements
//! - A file-backed control surface replaying recorded topologies
//! - The session state machine and periodic reconciliation loop
//! - Pushing and pulling LED colours through the surface

pub mod error;
pub mod lighting;
pub mod reconciler;
pub mod snapshot_surface;
pub mod surface;

pub use error::ReconcileError;
pub use lighting::ColorUpdate;
pub use reconciler::{
    DeviceEvent, DeviceReconciler, ReconcilerConfig, SessionState, SessionStatus, TickOutcome,
};
pub use snapshot_surface::SnapshotSurface;
pub use surface::{ControlSurface, ProtocolDetails, SurfaceError};
