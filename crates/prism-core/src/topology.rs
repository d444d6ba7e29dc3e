//! Topology resolution: raw vendor descriptors to logical devices

use tracing::{debug, trace};

use crate::address::{channel_reference_id, sub_device_reference};
use crate::classify::{classify_device, classify_sub_device, Classification, ModelTitles};
use crate::dedupe::dedupe_names;
use crate::device::{DeviceKind, GridSize, LedAddress, LedUnit, LogicalDevice};
use crate::overrides::{apply_override, find_override, truncate_to_spec, SpecOverride};
use crate::raw::{RawChannel, RawDeviceDescriptor, RawLedPosition, VendorDeviceType};

/// Keyboard LED rows start this far below the top edge of the device
const KEYBOARD_TOP_MARGIN: f64 = 38.0;

/// Walk one topology snapshot and produce the ordered logical device list
///
/// Names are not deduplicated; see [`resolve_devices`] for the full pass.
pub fn resolve_topology(
    devices: &[RawDeviceDescriptor],
    overrides: &[SpecOverride],
) -> Vec<LogicalDevice> {
    let mut resolved = Vec::new();
    let mut titles = ModelTitles::new();

    for raw in devices {
        let title = titles.next_title(&raw.model);
        if !raw.has_lighting() {
            debug!(index = raw.index, model = %raw.model, "Skipping device without lighting");
            continue;
        }

        let class = classify_device(raw.device_type, &title);
        let mut device = top_level_device(raw, &class);

        if !raw.channels.is_empty() {
            for channel in &raw.channels {
                resolve_channel(raw, channel, &title, &device, overrides, &mut resolved);
            }
        } else if raw.device_type == VendorDeviceType::Keyboard {
            populate_keyboard(&mut device, &raw.led_positions);
        } else {
            populate_positional(&mut device, &raw.led_positions);
        }

        if raw.channels.is_empty() {
            if let Some(spec) = class.default_spec {
                truncate_to_spec(&mut device, &spec);
                device.custom_spec = Some(spec);
            }
        }

        if raw.device_type.is_hub() {
            trace!(device = %device.name, "Hub device not emitted");
            continue;
        }

        resolved.push(device);
    }

    resolved
}

/// Resolve a topology snapshot and deduplicate the resulting names
pub fn resolve_devices(
    devices: &[RawDeviceDescriptor],
    overrides: &[SpecOverride],
) -> Vec<LogicalDevice> {
    dedupe_names(resolve_topology(devices, overrides))
}

fn top_level_device(raw: &RawDeviceDescriptor, class: &Classification) -> LogicalDevice {
    let mut device = LogicalDevice::new(class.name.clone(), class.kind, raw.index);
    device.thumbnail = class.thumbnail.clone();
    device
}

fn resolve_channel(
    raw: &RawDeviceDescriptor,
    channel: &RawChannel,
    title: &str,
    parent: &LogicalDevice,
    overrides: &[SpecOverride],
    resolved: &mut Vec<LogicalDevice>,
) {
    let Some(channel_ref) = channel_reference_id(raw.device_type, channel.index) else {
        debug!(
            device = %parent.name,
            channel = channel.index,
            "Skipping channel without a reference LED"
        );
        return;
    };
    let label = format!("Channel {}", channel.index + 1);

    if raw.device_type == VendorDeviceType::Cooler && channel.index == 0 {
        let led_count = channel.sub_devices.first().map_or(0, |sub| sub.led_count);
        let mut pump = LogicalDevice::new(parent.name.clone(), DeviceKind::Cooler, raw.index);
        pump.connected_to = Some(label.clone());
        pump.title_override = Some(title.to_string());
        pump.thumbnail = parent.thumbnail.clone();
        pump.leds = (0..led_count)
            .map(|index| LedUnit {
                index,
                address: LedAddress::Plain {
                    id: channel_ref + index as i32,
                },
                name: format!("Pump {}", index),
                color: None,
            })
            .collect();
        resolved.push(pump);
    }

    for (position, sub) in channel.sub_devices.iter().enumerate() {
        let reference = sub_device_reference(channel_ref, position, sub.led_count);
        let class = classify_sub_device(sub.kind, sub.led_count);
        let name = format!("{} {}", class.name, position + 1);

        let spec = match find_override(overrides, &name, title, channel.index) {
            Some(o) => {
                debug!(device = %name, led_count = o.led_count, "Applying caller override");
                Some(o.to_spec(class.default_spec.as_ref(), &class.thumbnail))
            }
            None => class.default_spec,
        };

        let mut device = LogicalDevice::new(name, class.kind, raw.index);
        device.connected_to = Some(label.clone());
        device.title_override = Some(title.to_string());
        device.thumbnail = class.thumbnail;

        resolved.push(apply_override(
            device,
            &parent.name,
            reference,
            sub.led_count,
            spec,
        ));
    }
}

fn populate_keyboard(device: &mut LogicalDevice, positions: &[RawLedPosition]) {
    if positions.is_empty() {
        return;
    }

    let mut sorted = positions.to_vec();
    sorted.sort_by_key(|p| p.led_id);

    device.leds = sorted
        .iter()
        .enumerate()
        .map(|(index, p)| LedUnit {
            index,
            address: LedAddress::Positional {
                id: p.led_id,
                x: p.left,
                y: (p.top - KEYBOARD_TOP_MARGIN).max(0.0),
            },
            name: format!("{} {}", device.name, index),
            color: None,
        })
        .collect();

    let width = positions.iter().map(|p| p.left).fold(f64::MIN, f64::max);
    let height = positions.iter().map(|p| p.top).fold(f64::MIN, f64::max);
    device.grid = Some(GridSize { width, height });
}

fn populate_positional(device: &mut LogicalDevice, positions: &[RawLedPosition]) {
    let mut sorted = positions.to_vec();
    sorted.sort_by(|a, b| (a.top + a.left).total_cmp(&(b.top + b.left)));

    device.leds = sorted
        .iter()
        .enumerate()
        .map(|(index, p)| LedUnit {
            index,
            address: LedAddress::Plain { id: p.led_id },
            name: format!("{} {}", device.name, index),
            color: None,
        })
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{ChannelDeviceType, DeviceCaps, RawSubDevice};

    fn sub(kind: ChannelDeviceType, led_count: usize) -> RawSubDevice {
        RawSubDevice { kind, led_count }
    }

    fn channel(index: usize, sub_devices: Vec<RawSubDevice>) -> RawChannel {
        RawChannel { index, sub_devices }
    }

    fn pos(led_id: i32, top: f64, left: f64) -> RawLedPosition {
        RawLedPosition { led_id, top, left }
    }

    #[test]
    fn test_non_lighting_devices_skipped() {
        let mut headset = RawDeviceDescriptor::new(0, VendorDeviceType::Headset, "VOID Wireless");
        headset.caps = DeviceCaps::PROPERTY_LOOKUP;
        let mouse = RawDeviceDescriptor::new(1, VendorDeviceType::Mouse, "M65 RGB");

        let devices = resolve_devices(&[headset, mouse], &[]);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "M65 RGB");
        assert_eq!(devices[0].thumbnail, "M65");
    }

    #[test]
    fn test_cooler_pump_and_sub_devices() {
        let mut cooler = RawDeviceDescriptor::new(0, VendorDeviceType::Cooler, "H150i PRO");
        cooler.channels = vec![
            channel(0, vec![sub(ChannelDeviceType::FanQl, 34)]),
            channel(1, vec![sub(ChannelDeviceType::FanLl, 16)]),
        ];

        let devices = resolve_devices(&[cooler], &[]);
        assert_eq!(devices.len(), 3);

        let pump = &devices[0];
        assert_eq!(pump.name, "H150i PRO");
        assert_eq!(pump.kind, DeviceKind::Cooler);
        assert_eq!(pump.connected_to.as_deref(), Some("Channel 1"));
        assert_eq!(pump.title_override.as_deref(), Some("Corsair H150i PRO"));
        assert_eq!(pump.leds.len(), 34);
        assert_eq!(pump.leds[0].name, "Pump 0");
        assert_eq!(pump.leds[33].address.id(), 762 + 33);

        assert_eq!(devices[1].name, "QL Fan 1");
        assert_eq!(devices[1].connected_to.as_deref(), Some("Channel 1"));
        assert_eq!(devices[2].name, "LL Fan 1");
        assert_eq!(devices[2].connected_to.as_deref(), Some("Channel 2"));
        // Every cooler channel addresses from the liquid-cooler base
        assert_eq!(devices[2].leds[0].address.id(), 762);
    }

    #[test]
    fn test_empty_cooler_channel_yields_empty_pump() {
        let mut cooler = RawDeviceDescriptor::new(0, VendorDeviceType::Cooler, "H100i");
        cooler.channels = vec![channel(0, vec![])];

        let devices = resolve_devices(&[cooler], &[]);
        assert_eq!(devices.len(), 1);
        assert!(devices[0].leds.is_empty());
    }

    #[test]
    fn test_commander_pro_channels() {
        let mut hub = RawDeviceDescriptor::new(2, VendorDeviceType::CommanderPro, "Commander PRO");
        hub.channels = vec![
            channel(
                0,
                vec![
                    sub(ChannelDeviceType::FanQl, 34),
                    sub(ChannelDeviceType::FanQl, 34),
                ],
            ),
            channel(3, vec![sub(ChannelDeviceType::FanQl, 34)]),
        ];

        let devices = resolve_devices(&[hub], &[]);
        // Hub excluded, channel 4 skipped
        assert_eq!(devices.len(), 2);

        let first = &devices[0];
        assert_eq!(first.name, "QL Fan 1");
        assert_eq!(first.device_index, 2);
        assert_eq!(first.title_override.as_deref(), Some("Corsair Commander PRO"));
        assert_eq!(first.leds[0].name, "Commander PRO 0");
        assert_eq!(first.leds[0].address.id(), 200);
        assert_eq!(first.leds[33].address.id(), 233);

        // Second fan starts at 234, still below the banded range
        let second = &devices[1];
        assert_eq!(second.name, "QL Fan 2");
        assert_eq!(second.leds[0].address.id(), 234);
        assert_eq!(second.leds[33].address.id(), 234 + 33);
    }

    #[test]
    fn test_second_channel_bands() {
        let mut hub = RawDeviceDescriptor::new(0, VendorDeviceType::LightningNodePro, "Lighting Node PRO");
        hub.channels = vec![channel(
            1,
            vec![
                sub(ChannelDeviceType::FanQl, 34),
                sub(ChannelDeviceType::FanQl, 34),
            ],
        )];

        let devices = resolve_devices(&[hub], &[]);
        // 350 is a sentinel: flat
        assert_eq!(devices[0].leds[14].address.id(), 364);
        // 384 is a sentinel: flat
        assert_eq!(devices[1].leds[14].address.id(), 398);
    }

    #[test]
    fn test_override_truncates() {
        let mut hub = RawDeviceDescriptor::new(0, VendorDeviceType::CommanderPro, "Commander PRO");
        hub.channels = vec![channel(0, vec![sub(ChannelDeviceType::Strip, 30)])];

        let devices = resolve_devices(&[hub.clone()], &[]);
        assert_eq!(devices[0].name, "Internal LED Strip 1");
        assert_eq!(devices[0].leds.len(), 10);
        for (i, led) in devices[0].leds.iter().enumerate() {
            assert_eq!(led.address, LedAddress::Plain { id: 200 + i as i32 });
        }

        let o = SpecOverride {
            name: "Internal LED Strip 1".to_string(),
            title: Some("Corsair Commander PRO".to_string()),
            channel: Some(1),
            led_count: 20,
            rgb_order: None,
            mapper: None,
        };
        let devices = resolve_devices(&[hub], &[o]);
        assert_eq!(devices[0].leds.len(), 20);
        assert_eq!(devices[0].custom_spec.as_ref().unwrap().led_count, 20);
    }

    #[test]
    fn test_keyboard_layout() {
        let mut kb = RawDeviceDescriptor::new(0, VendorDeviceType::Keyboard, "K70 RGB MK.2");
        kb.led_positions = vec![pos(30, 50.0, 100.0), pos(10, 20.0, 5.0), pos(20, 60.0, 40.0)];

        let devices = resolve_devices(&[kb], &[]);
        let kb = &devices[0];
        assert_eq!(kb.name, "K70 RGB MK.2");
        assert_eq!(kb.thumbnail, "K70v2");
        assert_eq!(
            kb.leds.iter().map(|l| l.address.id()).collect::<Vec<_>>(),
            vec![10, 20, 30]
        );
        assert_eq!(
            kb.leds[0].address,
            LedAddress::Positional { id: 10, x: 5.0, y: 0.0 }
        );
        assert_eq!(
            kb.leds[1].address,
            LedAddress::Positional { id: 20, x: 40.0, y: 22.0 }
        );
        assert_eq!(kb.leds[2].name, "K70 RGB MK.2 2");
        assert_eq!(kb.grid, Some(GridSize { width: 100.0, height: 60.0 }));
    }

    #[test]
    fn test_keyboard_without_positions() {
        let kb = RawDeviceDescriptor::new(0, VendorDeviceType::Keyboard, "K95 RGB");
        let devices = resolve_devices(&[kb], &[]);
        assert!(devices[0].leds.is_empty());
        assert!(devices[0].grid.is_none());
    }

    #[test]
    fn test_positional_devices_sorted_by_distance() {
        let mut mouse = RawDeviceDescriptor::new(0, VendorDeviceType::Mouse, "SCIMITAR RGB");
        mouse.led_positions = vec![pos(3, 10.0, 10.0), pos(1, 0.0, 5.0), pos(2, 2.0, 2.0)];

        let devices = resolve_devices(&[mouse], &[]);
        let ids: Vec<i32> = devices[0].leds.iter().map(|l| l.address.id()).collect();
        assert_eq!(ids, vec![2, 1, 3]);
        assert!(devices[0].grid.is_none());
    }

    #[test]
    fn test_mm800_truncated_to_polaris() {
        let mut pad = RawDeviceDescriptor::new(0, VendorDeviceType::Mousepad, "MM800RGB");
        pad.led_positions = (0..20).map(|i| pos(100 + i, 0.0, i as f64)).collect();

        let devices = resolve_devices(&[pad], &[]);
        assert_eq!(devices[0].leds.len(), 15);
        assert_eq!(devices[0].custom_spec.as_ref().unwrap().name, "MM800 RGB Polaris");
    }

    #[test]
    fn test_non_hub_with_channels_emitted() {
        let mut board = RawDeviceDescriptor::new(0, VendorDeviceType::Motherboard, "Z490");
        board.channels = vec![channel(0, vec![sub(ChannelDeviceType::Strip, 15)])];

        let devices = resolve_devices(&[board], &[]);
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].name, "250mm LED Strip 1");
        assert_eq!(devices[1].name, "Z490");
        assert!(devices[1].leds.is_empty());
    }

    #[test]
    fn test_repeated_models_get_numbered_titles() {
        let a = RawDeviceDescriptor::new(0, VendorDeviceType::MemoryModule, "VENGEANCE RGB PRO");
        let b = RawDeviceDescriptor::new(1, VendorDeviceType::MemoryModule, "VENGEANCE RGB PRO");
        let mut c = RawDeviceDescriptor::new(2, VendorDeviceType::MemoryModule, "VENGEANCE RGB PRO");
        c.caps = DeviceCaps::PROPERTY_LOOKUP;
        let d = RawDeviceDescriptor::new(3, VendorDeviceType::MemoryModule, "VENGEANCE RGB PRO");

        let devices = resolve_devices(&[a, b, c, d], &[]);
        let names: Vec<&str> = devices.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["VENGEANCE RGB PRO", "VENGEANCE RGB PRO 2", "VENGEANCE RGB PRO 4"]
        );
        assert!(devices.iter().all(|d| d.thumbnail == "VengeancePro"));
    }

    #[test]
    fn test_identical_hubs_get_distinct_titles() {
        let mut first = RawDeviceDescriptor::new(0, VendorDeviceType::CommanderPro, "Commander PRO");
        first.channels = vec![channel(0, vec![sub(ChannelDeviceType::FanQl, 34)])];
        let mut second = first.clone();
        second.index = 1;

        let devices = resolve_devices(&[first, second], &[]);
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].name, "QL Fan 1 (1)");
        assert_eq!(devices[0].title_override.as_deref(), Some("Corsair Commander PRO"));
        assert_eq!(devices[1].name, "QL Fan 1 (2)");
        assert_eq!(devices[1].title_override.as_deref(), Some("Corsair Commander PRO 2"));
        assert_ne!(devices[0].key(), devices[1].key());
    }
}
