//! Logical device types exposed to callers

use serde::{Deserialize, Serialize};

use crate::catalog::CustomDeviceSpecification;

/// Logical device category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Keyboard,
    Mouse,
    MousePad,
    Headset,
    HeadsetStand,
    Fan,
    LedStrip,
    Cooler,
    Memory,
    Motherboard,
    Gpu,
    #[default]
    Other,
}

/// Address of one LED in the vendor id space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LedAddress {
    /// Bare vendor LED id
    Plain { id: i32 },
    /// Vendor LED id with a position in the device grid (millimeters)
    Positional { id: i32, x: f64, y: f64 },
}

impl LedAddress {
    /// Vendor LED id, regardless of variant
    pub fn id(&self) -> i32 {
        match *self {
            LedAddress::Plain { id } => id,
            LedAddress::Positional { id, .. } => id,
        }
    }
}

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LedColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl LedColor {
    pub const BLACK: LedColor = LedColor { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A single controllable light cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedUnit {
    /// Position within the owning device, contiguous from 0
    pub index: usize,
    pub address: LedAddress,
    /// Human-readable name; channel LEDs are named after the controller (e.g. "Commander PRO 0")
    pub name: String,
    /// Last written or read colour, absent until either happens
    #[serde(default)]
    pub color: Option<LedColor>,
}

/// Grid dimensions of a positional device, in millimeters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: f64,
    pub height: f64,
}

/// Identity of a logical device across scans
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceKey {
    pub name: String,
    pub title_override: Option<String>,
}

impl std::fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.title_override {
            Some(title) => write!(f, "{} [{}]", self.name, title),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A named, individually addressable device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalDevice {
    /// Display name, unique within one resolution pass
    pub name: String,
    pub kind: DeviceKind,
    /// Owning vendor device index
    pub device_index: usize,
    /// Channel label for channel products (e.g. "Channel 2")
    pub connected_to: Option<String>,
    /// Raw model title for channel products
    pub title_override: Option<String>,
    /// Thumbnail asset key
    pub thumbnail: String,
    pub grid: Option<GridSize>,
    pub leds: Vec<LedUnit>,
    /// Spec applied during resolution, if any
    pub custom_spec: Option<CustomDeviceSpecification>,
}

impl LogicalDevice {
    pub fn new(name: impl Into<String>, kind: DeviceKind, device_index: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            device_index,
            connected_to: None,
            title_override: None,
            thumbnail: String::new(),
            grid: None,
            leds: Vec::new(),
            custom_spec: None,
        }
    }

    /// Identity key used when diffing scans
    pub fn key(&self) -> DeviceKey {
        DeviceKey {
            name: self.name.clone(),
            title_override: self.title_override.clone(),
        }
    }

    /// Whether this device matches the given identity key
    pub fn has_key(&self, key: &DeviceKey) -> bool {
        self.name == key.name && self.title_override == key.title_override
    }

    pub fn led_by_address(&self, id: i32) -> Option<&LedUnit> {
        self.leds.iter().find(|led| led.address.id() == id)
    }
}
