//! LED address computation
//!
//! The vendor numbers LEDs on controller channels in two id blocks. The first
//! 150 LEDs of a channel sit in the lower block starting at the channel's
//! reference id; everything past that lives in an upper block offset by
//! [`UPPER_BAND_OFFSET`]. Which block a sub-device's LEDs land in depends on
//! its reference id and LED count, following the table in [`band_policy`].

use crate::raw::VendorDeviceType;

/// First LED of custom-device channel 1
pub const CHANNEL_1_REFERENCE: i32 = 200;
/// First LED of custom-device channel 2
pub const CHANNEL_2_REFERENCE: i32 = 350;
/// First LED of custom-device channel 3
pub const CHANNEL_3_REFERENCE: i32 = 612;
/// First LED of liquid-cooler channel 1
pub const COOLER_REFERENCE: i32 = 762;

/// Distance between the lower and upper id blocks
pub const UPPER_BAND_OFFSET: i32 = 562;
/// Sub-devices with at most this many LEDs are always addressed flat
pub const WIDE_LED_THRESHOLD: usize = 30;
/// Split-policy sub-devices keep this many LEDs in the lower block
pub const SPLIT_INDEX: usize = 14;

/// Reference ids that never move to the upper block on their own
pub const BAND_SENTINELS: [i32; 5] = [350, 384, 418, 452, 486];

/// How a sub-device's LEDs map onto the vendor id blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandPolicy {
    /// Every LED at `reference + index`
    Flat,
    /// Every LED at `reference + offset + index`
    Upper,
    /// Lower block below [`SPLIT_INDEX`], upper block from there on
    Split,
}

fn is_sentinel(reference: i32) -> bool {
    BAND_SENTINELS.contains(&reference)
}

/// Pick the band policy for a sub-device
///
/// The rows overlap and are evaluated top to bottom:
///
/// | led count | reference                   | policy |
/// |-----------|-----------------------------|--------|
/// | <= 30     | any                         | Flat   |
/// | > 30      | > 369, not a sentinel       | Upper  |
/// | > 30      | > 335, not a sentinel       | Split  |
/// | > 30      | >= 486                      | Split  |
/// | > 30      | otherwise                   | Flat   |
pub fn band_policy(reference: i32, led_count: usize) -> BandPolicy {
    if led_count <= WIDE_LED_THRESHOLD {
        return BandPolicy::Flat;
    }

    let sentinel = is_sentinel(reference);
    if reference > 369 && !sentinel {
        BandPolicy::Upper
    } else if reference > 335 && !sentinel {
        BandPolicy::Split
    } else if reference >= 486 {
        BandPolicy::Split
    } else {
        BandPolicy::Flat
    }
}

/// Vendor LED id for one LED of a sub-device
pub fn resolve_led_address(reference: i32, led_count: usize, led_index: usize) -> i32 {
    let index = led_index as i32;
    match band_policy(reference, led_count) {
        BandPolicy::Flat => reference + index,
        BandPolicy::Upper => reference + UPPER_BAND_OFFSET + index,
        BandPolicy::Split if led_index < SPLIT_INDEX => reference + index,
        BandPolicy::Split => reference + UPPER_BAND_OFFSET + index,
    }
}

/// Reference id of a controller channel
///
/// Returns `None` for channels the vendor id space has no block for.
/// Coolers address every channel from the liquid-cooler base.
pub fn channel_reference_id(device_type: VendorDeviceType, channel: usize) -> Option<i32> {
    if device_type == VendorDeviceType::Cooler {
        return Some(COOLER_REFERENCE);
    }

    match channel {
        0 => Some(CHANNEL_1_REFERENCE),
        1 => Some(CHANNEL_2_REFERENCE),
        2 => Some(CHANNEL_3_REFERENCE),
        _ => None,
    }
}

/// Reference id of the `position`-th sub-device on a channel
pub fn sub_device_reference(channel_reference: i32, position: usize, led_count: usize) -> i32 {
    channel_reference + (position * led_count) as i32
}
