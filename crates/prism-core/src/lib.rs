//! Prism Core - Vendor topology types and device resolution
//!
//! This crate provides the foundational pieces of the Prism system:
//! - Raw vendor descriptors (devices, channels, sub-devices, LED positions)
//! - LED address computation for the vendor's banded LED-id space
//! - Device classification and the built-in spec catalog
//! - Topology resolution into named, addressable logical devices
//! - Name deduplication and topology snapshot files

pub mod address;
pub mod catalog;
pub mod classify;
pub mod dedupe;
pub mod device;
pub mod overrides;
pub mod raw;
pub mod snapshot;
pub mod topology;

pub use catalog::{CustomDeviceSpecification, RgbOrder};
pub use classify::{Classification, ModelTitles};
pub use dedupe::dedupe_names;
pub use device::{DeviceKey, DeviceKind, GridSize, LedAddress, LedColor, LedUnit, LogicalDevice};
pub use overrides::SpecOverride;
pub use raw::{
    ChannelDeviceType, DeviceCaps, RawChannel, RawDeviceDescriptor, RawLedPosition, RawSubDevice,
    VendorDeviceType,
};
pub use snapshot::{SnapshotError, TopologySnapshot};
pub use topology::{resolve_devices, resolve_topology};
