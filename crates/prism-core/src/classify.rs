//! Device classification
//!
//! Maps vendor device types and channel products onto logical kinds, display
//! names, thumbnail keys and default specs. Classification is total: anything
//! unrecognized becomes an "Unknown" device of kind [`DeviceKind::Other`].

use std::collections::HashMap;

use crate::catalog::{self, CustomDeviceSpecification, MANUFACTURER};
use crate::device::DeviceKind;
use crate::raw::{ChannelDeviceType, VendorDeviceType};

pub const PLACEHOLDER_THUMBNAIL: &str = "CorsairPlaceholder";

/// Result of classifying a device or channel product
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub kind: DeviceKind,
    pub name: String,
    pub thumbnail: String,
    pub default_spec: Option<CustomDeviceSpecification>,
}

/// Known product titles and their thumbnail keys
const TITLE_THUMBNAILS: &[(&str, &str)] = &[
    // Keyboards
    ("Corsair K65 RGB", "K65"),
    ("Corsair K65 LUX RGB", "K65"),
    ("Corsair K68 RGB", "K68"),
    ("Corsair STRAFE RGB", "Strafe"),
    ("Corsair K70 RGB", "K70"),
    ("Corsair K70 LUX RGB", "K70"),
    ("Corsair K95 RGB", "K95"),
    ("Corsair K70 RGB MK.2", "K70v2"),
    ("Corsair K70 RGB MK.2 LP", "K70v2"),
    ("Corsair K70 RGB MK.2 SE", "K70v2SE"),
    ("Corsair STRAFE RGB MK.2", "Strafev2"),
    ("Corsair K95 RGB PLATINUM", "K95Plat"),
    ("Corsair K95 RGB PLATINUM XT", "K95Plat"),
    // Mice
    ("Corsair HARPOON RGB", "Harpoon"),
    ("Corsair HARPOON RGB PRO", "Harpoon"),
    ("Corsair HARPOON RGB WIRELESS", "Harpoon"),
    ("Corsair M55 RGB", "M55"),
    ("Corsair M65 RGB", "M65"),
    ("Corsair M65 PRO RGB", "M65"),
    ("Corsair M65 RGB ELITE", "M65"),
    ("Corsair SCIMITAR RGB", "Scimitar"),
    ("Corsair SCIMITAR PRO RGB", "Scimitar"),
    ("Corsair SCIMITAR ELITE RGB", "Scimitar"),
    ("Corsair IRONCLAW RGB", "Ironclaw"),
    ("Corsair IRONCLAW RGB WIRELESS", "Ironclaw"),
    ("Corsair GLAIVE RGB", "Glaive"),
    ("Corsair GLAIVE RGB PRO", "Glaive"),
    ("Corsair NIGHTSWORD RGB", "Nightsword"),
    ("Corsair DARK CORE RGB", "DarkCore"),
    ("Corsair DARK CORE RGB SE", "DarkCore"),
    ("Corsair DARK CORE PRO RGB", "DarkCore"),
    ("Corsair DARK CORE PRO RGB SE", "DarkCore"),
    // Mouse pads
    ("Corsair MM800RGB", "MM800"),
    ("Corsair MM800CRGB", "MM800"),
    // Headset stands
    ("Corsair ST100RGB", "ST100"),
    // Headsets
    ("Corsair VOID Wireless", "Void"),
    ("Corsair VOID PRO Wireless", "Void"),
    ("Corsair VOID ELITE Wireless", "Void"),
    ("Corsair VIRTUOSO RGB Wireless", "Virtuoso"),
    ("Corsair VIRTUOSO SE RGB Wireless", "Virtuoso"),
    // Memory
    ("Corsair VENGEANCE RGB PRO", "VengeancePro"),
    ("Corsair VENGEANCE RGB PRO 2", "VengeancePro"),
    ("Corsair VENGEANCE RGB PRO 3", "VengeancePro"),
    ("Corsair VENGEANCE RGB PRO 4", "VengeancePro"),
    ("Corsair VENGEANCE RGB PRO 5", "VengeancePro"),
    ("Corsair VENGEANCE RGB PRO 6", "VengeancePro"),
    ("Corsair VENGEANCE RGB PRO 7", "VengeancePro"),
    ("Corsair VENGEANCE RGB PRO 8", "VengeancePro"),
    ("Corsair DOMINATOR PLATINUM RGB", "DomPlat"),
    ("Corsair DOMINATOR PLATINUM RGB 2", "DomPlat"),
    ("Corsair DOMINATOR PLATINUM RGB 3", "DomPlat"),
    ("Corsair DOMINATOR PLATINUM RGB 4", "DomPlat"),
    ("Corsair DOMINATOR PLATINUM RGB 5", "DomPlat"),
    ("Corsair DOMINATOR PLATINUM RGB 6", "DomPlat"),
    ("Corsair DOMINATOR PLATINUM RGB 7", "DomPlat"),
    ("Corsair DOMINATOR PLATINUM RGB 8", "DomPlat"),
];

/// Thumbnail key for an exact product title
pub fn title_thumbnail(title: &str) -> Option<&'static str> {
    TITLE_THUMBNAILS
        .iter()
        .find(|(known, _)| *known == title)
        .map(|(_, key)| *key)
}

/// Fallback thumbnail for a device kind
pub fn kind_thumbnail(kind: DeviceKind) -> &'static str {
    match kind {
        DeviceKind::Keyboard => "K95Plat",
        DeviceKind::Mouse => "Scimitar",
        DeviceKind::MousePad => "MM800",
        DeviceKind::Headset => "Void",
        DeviceKind::HeadsetStand => "ST100",
        DeviceKind::Motherboard => "Motherboard",
        DeviceKind::Gpu => "GPU",
        DeviceKind::Cooler => "AIO",
        DeviceKind::Fan => "QLFan",
        DeviceKind::LedStrip => "LedStrip",
        DeviceKind::Memory => "VengeancePro",
        DeviceKind::Other => PLACEHOLDER_THUMBNAIL,
    }
}

pub fn device_kind(device_type: VendorDeviceType) -> DeviceKind {
    match device_type {
        VendorDeviceType::Keyboard => DeviceKind::Keyboard,
        VendorDeviceType::Mouse => DeviceKind::Mouse,
        VendorDeviceType::Mousepad => DeviceKind::MousePad,
        VendorDeviceType::Headset => DeviceKind::Headset,
        VendorDeviceType::HeadsetStand => DeviceKind::HeadsetStand,
        VendorDeviceType::Cooler => DeviceKind::Cooler,
        VendorDeviceType::MemoryModule => DeviceKind::Memory,
        VendorDeviceType::Motherboard => DeviceKind::Motherboard,
        VendorDeviceType::GraphicsCard => DeviceKind::Gpu,
        VendorDeviceType::CommanderPro
        | VendorDeviceType::LightningNodePro
        | VendorDeviceType::Unknown => DeviceKind::Other,
    }
}

/// Strip demo markers from a raw model string
pub fn clean_model(model: &str) -> String {
    let mut cleaned = model.to_string();
    for marker in [" DEMO", "DEMO"] {
        while let Some(pos) = cleaned.to_ascii_uppercase().find(marker) {
            cleaned.replace_range(pos..pos + marker.len(), "");
        }
    }
    cleaned.trim().to_string()
}

/// Manufacturer-prefixed product title for a raw model string
pub fn model_title(model: &str) -> String {
    format!("{} {}", MANUFACTURER, clean_model(model))
}

/// Numbers repeated models within one enumeration pass
///
/// The first device of a model keeps the plain title, later ones get
/// `" 2"`, `" 3"`, and so on. Every enumerated device counts, lighting or not.
#[derive(Debug, Default)]
pub struct ModelTitles {
    seen: HashMap<String, usize>,
}

impl ModelTitles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unique title for the next device reporting `model`
    pub fn next_title(&mut self, model: &str) -> String {
        let title = model_title(model);
        let count = self.seen.entry(title.clone()).or_insert(0);
        *count += 1;
        match *count {
            1 => title,
            n => format!("{} {}", title, n),
        }
    }
}

/// Display name of a top-level device, derived from its title
pub fn display_name(title: &str) -> String {
    title.replace(MANUFACTURER, "").trim().to_string()
}

/// Classify a top-level device by vendor type and product title
pub fn classify_device(device_type: VendorDeviceType, title: &str) -> Classification {
    let kind = device_kind(device_type);
    let known = title_thumbnail(title);
    let thumbnail = known.unwrap_or_else(|| kind_thumbnail(kind)).to_string();

    let default_spec = match (kind, known) {
        (DeviceKind::MousePad, Some("MM800")) => Some(catalog::mm800_polaris()),
        _ => None,
    };

    Classification {
        kind,
        name: display_name(title),
        thumbnail,
        default_spec,
    }
}

/// Classify a channel product by type and LED count
pub fn classify_sub_device(kind: ChannelDeviceType, led_count: usize) -> Classification {
    let default_spec = catalog::default_spec(kind, led_count);

    let (kind, name) = match kind {
        ChannelDeviceType::FanHd => (DeviceKind::Fan, "HD Fan"),
        ChannelDeviceType::FanSp => (DeviceKind::Fan, "SP Fan"),
        ChannelDeviceType::FanMl => (DeviceKind::Fan, "ML Fan"),
        ChannelDeviceType::FanLl => (DeviceKind::Fan, "LL Fan"),
        ChannelDeviceType::FanQl => (DeviceKind::Fan, "QL Fan"),
        ChannelDeviceType::Strip => (
            DeviceKind::LedStrip,
            match led_count {
                15 => "250mm LED Strip",
                21 => "350mm LED Strip",
                27 => "450mm LED Strip",
                n if n > 80 => "1.4M LED Strip",
                _ => "Internal LED Strip",
            },
        ),
        ChannelDeviceType::Invalid if led_count == 27 => (DeviceKind::LedStrip, "LT100 RGB"),
        ChannelDeviceType::Dap => (DeviceKind::Other, "DAP"),
        _ => (DeviceKind::Other, "Unknown"),
    };

    let thumbnail = default_spec
        .as_ref()
        .map(|spec| spec.thumbnail.clone())
        .unwrap_or_else(|| PLACEHOLDER_THUMBNAIL.to_string());

    Classification {
        kind,
        name: name.to_string(),
        thumbnail,
        default_spec,
    }
}
