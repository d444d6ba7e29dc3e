//! Raw vendor topology as reported by the control surface
//!
//! These types mirror what the vendor SDK hands back on every enumeration.
//! They are produced fresh per scan and never mutated by the resolver.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Vendor device type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorDeviceType {
    #[default]
    Unknown,
    Mouse,
    Keyboard,
    Headset,
    Mousepad,
    HeadsetStand,
    /// Multi-channel fan/LED controller
    CommanderPro,
    /// Multi-channel LED controller
    LightningNodePro,
    MemoryModule,
    /// Liquid cooler; its channels carry the pump and attached fans
    Cooler,
    Motherboard,
    GraphicsCard,
}

impl VendorDeviceType {
    /// Map a raw SDK integer code to a device type
    ///
    /// Unrecognized codes (including the SDK's second "unknown" code, 10)
    /// map to [`VendorDeviceType::Unknown`].
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Mouse,
            2 => Self::Keyboard,
            3 => Self::Headset,
            4 => Self::Mousepad,
            5 => Self::HeadsetStand,
            6 => Self::CommanderPro,
            7 => Self::LightningNodePro,
            8 => Self::MemoryModule,
            9 => Self::Cooler,
            11 => Self::Motherboard,
            12 => Self::GraphicsCard,
            _ => Self::Unknown,
        }
    }

    /// Device types that only carry channels and are never emitted themselves
    pub fn is_hub(self) -> bool {
        matches!(
            self,
            Self::CommanderPro | Self::LightningNodePro | Self::Cooler
        )
    }
}

/// Type of an LED device attached to a controller channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelDeviceType {
    Invalid,
    FanHd,
    FanSp,
    FanLl,
    FanMl,
    Strip,
    Dap,
    Pump,
    FanQl,
    /// Any code this build does not know about
    Unknown,
}

impl ChannelDeviceType {
    /// Map a raw SDK integer code to a channel device type
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Invalid,
            1 => Self::FanHd,
            2 => Self::FanSp,
            3 => Self::FanLl,
            4 => Self::FanMl,
            5 => Self::Strip,
            6 => Self::Dap,
            7 => Self::Pump,
            8 => Self::FanQl,
            _ => Self::Unknown,
        }
    }
}

bitflags::bitflags! {
    /// Device capability bitmask
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DeviceCaps: u32 {
        /// Device has SDK-controllable lighting
        const LIGHTING = 1 << 0;
        /// Device exposes state through property lookups
        const PROPERTY_LOOKUP = 1 << 1;
    }
}

impl DeviceCaps {
    pub fn has_lighting(self) -> bool {
        self.contains(Self::LIGHTING)
    }
}

// Snapshots carry the raw SDK mask, so caps go over the wire as bits
impl Serialize for DeviceCaps {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DeviceCaps {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u32::deserialize(deserializer).map(Self::from_bits_retain)
    }
}

/// Position of a single LED, in millimeters from the device's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawLedPosition {
    /// Vendor LED id
    pub led_id: i32,
    pub top: f64,
    pub left: f64,
}

/// A sub-device (fan, strip segment, ...) attached to a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSubDevice {
    pub kind: ChannelDeviceType,
    pub led_count: usize,
}

/// One channel of a DIY/controller device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawChannel {
    /// Channel index on the controller (0-based)
    pub index: usize,
    /// Attached sub-devices, in bus order
    #[serde(default, rename = "sub_device")]
    pub sub_devices: Vec<RawSubDevice>,
}

/// A top-level device as reported by the control surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDeviceDescriptor {
    /// Vendor device index, used for all per-device SDK calls
    pub index: usize,
    pub device_type: VendorDeviceType,
    #[serde(default = "default_caps")]
    pub caps: DeviceCaps,
    /// Raw model string (e.g. "K70 RGB MK.2")
    pub model: String,
    #[serde(default, rename = "channel")]
    pub channels: Vec<RawChannel>,
    /// LED positions; only consulted when the device has no channels
    #[serde(default, rename = "led_position")]
    pub led_positions: Vec<RawLedPosition>,
}

fn default_caps() -> DeviceCaps {
    DeviceCaps::LIGHTING
}

impl RawDeviceDescriptor {
    /// Create a lighting-capable descriptor with no channels or positions
    pub fn new(index: usize, device_type: VendorDeviceType, model: impl Into<String>) -> Self {
        Self {
            index,
            device_type,
            caps: DeviceCaps::LIGHTING,
            model: model.into(),
            channels: Vec::new(),
            led_positions: Vec::new(),
        }
    }

    pub fn has_lighting(&self) -> bool {
        self.caps.has_lighting()
    }
}
