//! Applying custom device specifications to classified devices
//!
//! A spec can only ever shrink the LED set a device reports. When a spec
//! declares fewer LEDs than the hardware, the extra LEDs are dropped; when it
//! declares more, the hardware count stands.

use serde::{Deserialize, Serialize};

use crate::address::resolve_led_address;
use crate::catalog::{CustomDeviceSpecification, RgbOrder, MANUFACTURER};
use crate::device::{LedAddress, LedUnit, LogicalDevice};

/// Caller-supplied spec for a channel product
///
/// Matched against the ordinal display name of a sub-device (e.g. "QL Fan 2"),
/// optionally narrowed to one product title and one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecOverride {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    /// 1-based channel number
    #[serde(default)]
    pub channel: Option<usize>,
    pub led_count: usize,
    #[serde(default)]
    pub rgb_order: Option<RgbOrder>,
    #[serde(default)]
    pub mapper: Option<String>,
}

impl SpecOverride {
    /// Whether this override targets the given sub-device
    ///
    /// `channel` is the 0-based channel index.
    pub fn matches(&self, name: &str, title: &str, channel: usize) -> bool {
        if self.name != name {
            return false;
        }
        if let Some(wanted) = &self.title {
            if wanted != title {
                return false;
            }
        }
        match self.channel {
            Some(wanted) => wanted == channel + 1,
            None => true,
        }
    }

    /// Build the effective spec, inheriting unset fields from `base`
    pub fn to_spec(
        &self,
        base: Option<&CustomDeviceSpecification>,
        thumbnail: &str,
    ) -> CustomDeviceSpecification {
        CustomDeviceSpecification {
            name: base
                .map(|spec| spec.name.clone())
                .unwrap_or_else(|| self.name.clone()),
            manufacturer: base
                .map(|spec| spec.manufacturer.clone())
                .unwrap_or_else(|| MANUFACTURER.to_string()),
            led_count: self.led_count,
            rgb_order: self
                .rgb_order
                .or(base.map(|spec| spec.rgb_order))
                .unwrap_or_default(),
            mapper: self
                .mapper
                .clone()
                .or_else(|| base.and_then(|spec| spec.mapper.clone())),
            thumbnail: base
                .map(|spec| spec.thumbnail.clone())
                .unwrap_or_else(|| thumbnail.to_string()),
        }
    }
}

/// First override matching a sub-device
pub fn find_override<'a>(
    overrides: &'a [SpecOverride],
    name: &str,
    title: &str,
    channel: usize,
) -> Option<&'a SpecOverride> {
    overrides.iter().find(|o| o.matches(name, title, channel))
}

/// Number of LEDs a device ends up with under an optional spec
pub fn effective_led_count(reported: usize, spec: Option<&CustomDeviceSpecification>) -> usize {
    match spec {
        Some(spec) => spec.led_count.min(reported),
        None => reported,
    }
}

/// Generate the LED units of a channel product
///
/// Addresses follow the band policy for the reported LED count even when the
/// spec truncates the set.
pub fn generate_leds(
    label: &str,
    reference: i32,
    reported: usize,
    spec: Option<&CustomDeviceSpecification>,
) -> Vec<LedUnit> {
    (0..effective_led_count(reported, spec))
        .map(|index| LedUnit {
            index,
            address: LedAddress::Plain {
                id: resolve_led_address(reference, reported, index),
            },
            name: format!("{} {}", label, index),
            color: None,
        })
        .collect()
}

/// Populate a classified sub-device with its LEDs under an optional spec
pub fn apply_override(
    mut device: LogicalDevice,
    label: &str,
    reference: i32,
    reported: usize,
    spec: Option<CustomDeviceSpecification>,
) -> LogicalDevice {
    device.leds = generate_leds(label, reference, reported, spec.as_ref());
    device.custom_spec = spec;
    device
}

/// Drop LEDs beyond the spec's count from an already populated device
pub fn truncate_to_spec(device: &mut LogicalDevice, spec: &CustomDeviceSpecification) {
    device.leds.truncate(spec.led_count);
}
