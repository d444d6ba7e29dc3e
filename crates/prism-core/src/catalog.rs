//! Built-in custom device specifications
//!
//! Channel products (fans, strips) don't report a model of their own, only a
//! channel device type and an LED count. The catalog maps that pair onto a
//! known product specification. Lookup walks a static ordered table and the
//! first matching row wins, so narrow LED-count buckets must precede the
//! catch-all row for the same channel type.

use serde::{Deserialize, Serialize};

use crate::raw::ChannelDeviceType;

pub const MANUFACTURER: &str = "Corsair";

/// Channel colour byte order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RgbOrder {
    #[default]
    Rgb,
    Rbg,
    Grb,
    Gbr,
    Brg,
    Bgr,
}

/// Description of a known LED product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomDeviceSpecification {
    pub name: String,
    pub manufacturer: String,
    /// Number of LEDs the product actually has
    pub led_count: usize,
    pub rgb_order: RgbOrder,
    /// Optional LED-id mapper identifier
    pub mapper: Option<String>,
    /// Thumbnail asset key
    pub thumbnail: String,
}

impl CustomDeviceSpecification {
    fn corsair(name: &str, led_count: usize, thumbnail: &str) -> Self {
        Self {
            name: name.to_string(),
            manufacturer: MANUFACTURER.to_string(),
            led_count,
            rgb_order: RgbOrder::Rgb,
            mapper: None,
            thumbnail: thumbnail.to_string(),
        }
    }
}

pub fn sp_fan() -> CustomDeviceSpecification {
    CustomDeviceSpecification::corsair("SP Fan", 1, "SPFan")
}

pub fn ml_fan() -> CustomDeviceSpecification {
    CustomDeviceSpecification::corsair("ML Fan", 4, "MLFan")
}

pub fn hd_fan() -> CustomDeviceSpecification {
    CustomDeviceSpecification::corsair("HD Fan", 12, "HDFan")
}

pub fn ll_fan() -> CustomDeviceSpecification {
    CustomDeviceSpecification::corsair("LL Fan", 16, "LLFan")
}

pub fn ql_fan() -> CustomDeviceSpecification {
    CustomDeviceSpecification::corsair("QL Fan", 34, "QLFan")
}

pub fn sp_ml_pro_fan() -> CustomDeviceSpecification {
    CustomDeviceSpecification::corsair("SP/ML Pro Fan", 8, "SPProFan")
}

pub fn internal_led_strip() -> CustomDeviceSpecification {
    CustomDeviceSpecification::corsair("Internal LED Strip", 10, "LedStrip")
}

pub fn ls100_250mm() -> CustomDeviceSpecification {
    CustomDeviceSpecification::corsair("250mm LED Strip", 15, "LS100-250mm")
}

pub fn ls100_350mm() -> CustomDeviceSpecification {
    CustomDeviceSpecification::corsair("350mm LED Strip", 21, "LS100-350mm")
}

pub fn ls100_450mm() -> CustomDeviceSpecification {
    CustomDeviceSpecification::corsair("450mm LED Strip", 27, "LS100-450mm")
}

pub fn ls100_1m() -> CustomDeviceSpecification {
    CustomDeviceSpecification::corsair("1.4M LED Strip", 82, "LS100-1M")
}

pub fn lt100() -> CustomDeviceSpecification {
    CustomDeviceSpecification::corsair("LT100", 46, "LT100")
}

/// Spec for the MM800 mouse pad edge lighting
pub fn mm800_polaris() -> CustomDeviceSpecification {
    CustomDeviceSpecification::corsair("MM800 RGB Polaris", 15, "MM800")
}

/// LED-count condition of a catalog row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedBucket {
    Any,
    Exactly(usize),
    Above(usize),
}

impl LedBucket {
    pub fn contains(self, led_count: usize) -> bool {
        match self {
            LedBucket::Any => true,
            LedBucket::Exactly(n) => led_count == n,
            LedBucket::Above(n) => led_count > n,
        }
    }
}

type SpecConstructor = fn() -> CustomDeviceSpecification;

const CATALOG: &[(ChannelDeviceType, LedBucket, SpecConstructor)] = &[
    (ChannelDeviceType::FanSp, LedBucket::Exactly(8), sp_ml_pro_fan),
    (ChannelDeviceType::FanMl, LedBucket::Exactly(8), sp_ml_pro_fan),
    (ChannelDeviceType::FanSp, LedBucket::Any, sp_fan),
    (ChannelDeviceType::FanMl, LedBucket::Any, ml_fan),
    (ChannelDeviceType::FanHd, LedBucket::Any, hd_fan),
    (ChannelDeviceType::FanLl, LedBucket::Any, ll_fan),
    (ChannelDeviceType::FanQl, LedBucket::Any, ql_fan),
    (ChannelDeviceType::Strip, LedBucket::Exactly(15), ls100_250mm),
    (ChannelDeviceType::Strip, LedBucket::Exactly(21), ls100_350mm),
    (ChannelDeviceType::Strip, LedBucket::Exactly(27), ls100_450mm),
    (ChannelDeviceType::Strip, LedBucket::Above(80), ls100_1m),
    (ChannelDeviceType::Strip, LedBucket::Any, internal_led_strip),
    (ChannelDeviceType::Invalid, LedBucket::Exactly(27), lt100),
];

/// Default spec for a channel product, if the catalog knows it
pub fn default_spec(kind: ChannelDeviceType, led_count: usize) -> Option<CustomDeviceSpecification> {
    CATALOG
        .iter()
        .find(|(row_kind, bucket, _)| *row_kind == kind && bucket.contains(led_count))
        .map(|(_, _, build)| build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fan_lookup() {
        assert_eq!(default_spec(ChannelDeviceType::FanQl, 34).unwrap().led_count, 34);
        assert_eq!(default_spec(ChannelDeviceType::FanLl, 16).unwrap().name, "LL Fan");
        assert_eq!(default_spec(ChannelDeviceType::FanHd, 12).unwrap().thumbnail, "HDFan");
    }

    #[test]
    fn test_pro_fan_bucket() {
        let spec = default_spec(ChannelDeviceType::FanSp, 8).unwrap();
        assert_eq!(spec.name, "SP/ML Pro Fan");
        let spec = default_spec(ChannelDeviceType::FanMl, 8).unwrap();
        assert_eq!(spec.name, "SP/ML Pro Fan");
        let spec = default_spec(ChannelDeviceType::FanMl, 4).unwrap();
        assert_eq!(spec.name, "ML Fan");
    }

    #[test]
    fn test_strip_buckets() {
        let name = |n| default_spec(ChannelDeviceType::Strip, n).unwrap().name;
        assert_eq!(name(15), "250mm LED Strip");
        assert_eq!(name(21), "350mm LED Strip");
        assert_eq!(name(27), "450mm LED Strip");
        assert_eq!(name(82), "1.4M LED Strip");
        assert_eq!(name(80), "Internal LED Strip");
        assert_eq!(name(10), "Internal LED Strip");
    }

    #[test]
    fn test_unknown_types_have_no_spec() {
        assert!(default_spec(ChannelDeviceType::Invalid, 10).is_none());
        assert!(default_spec(ChannelDeviceType::Dap, 10).is_none());
        assert!(default_spec(ChannelDeviceType::Pump, 10).is_none());
        assert!(default_spec(ChannelDeviceType::Unknown, 10).is_none());
        assert_eq!(default_spec(ChannelDeviceType::Invalid, 27).unwrap().name, "LT100");
    }

    #[test]
    fn test_defaults() {
        let spec = mm800_polaris();
        assert_eq!(spec.manufacturer, "Corsair");
        assert_eq!(spec.rgb_order, RgbOrder::Rgb);
        assert!(spec.mapper.is_none());
    }
}
