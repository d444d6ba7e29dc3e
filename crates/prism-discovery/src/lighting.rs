//! Colour I/O between logical devices and the control surface

use prism_core::{LedColor, LogicalDevice};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::surface::{ControlSurface, SurfaceError};

/// Colour for one LED, by index within its device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedAssignment {
    pub index: usize,
    pub color: LedColor,
}

/// Colour changes to apply before pushing a device
///
/// `fill` is applied first, then the per-LED assignments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorUpdate {
    #[serde(default)]
    pub fill: Option<LedColor>,
    #[serde(default)]
    pub leds: Vec<LedAssignment>,
}

impl ColorUpdate {
    pub fn fill(color: LedColor) -> Self {
        Self {
            fill: Some(color),
            leds: Vec::new(),
        }
    }

    /// Apply to a device's live colours, returning how many LEDs changed
    pub fn apply(&self, device: &mut LogicalDevice) -> usize {
        let mut changed = 0;

        if let Some(color) = self.fill {
            for led in &mut device.leds {
                led.color = Some(color);
            }
            changed = device.leds.len();
        }

        for assignment in &self.leds {
            match device.leds.get_mut(assignment.index) {
                Some(led) => {
                    led.color = Some(assignment.color);
                    changed += 1;
                }
                None => {
                    debug!(
                        device = %device.name,
                        index = assignment.index,
                        "Ignoring colour for nonexistent LED"
                    );
                }
            }
        }

        changed
    }
}

/// Write every LED with a known colour to the surface
///
/// Returns the number of LEDs written.
pub fn push_device(
    surface: &dyn ControlSurface,
    device: &LogicalDevice,
) -> Result<usize, SurfaceError> {
    let colors: Vec<(i32, LedColor)> = device
        .leds
        .iter()
        .filter_map(|led| led.color.map(|color| (led.address.id(), color)))
        .collect();

    if colors.is_empty() {
        return Ok(0);
    }

    surface.write_colors(device.device_index, &colors)?;
    trace!(device = %device.name, count = colors.len(), "Pushed colours");
    Ok(colors.len())
}

/// Read every LED's colour back from the surface
///
/// Results are matched by address; addresses that don't belong to the device
/// are ignored. Returns the number of LEDs updated.
pub fn pull_device(
    surface: &dyn ControlSurface,
    device: &mut LogicalDevice,
) -> Result<usize, SurfaceError> {
    let addresses: Vec<i32> = device.leds.iter().map(|led| led.address.id()).collect();
    if addresses.is_empty() {
        return Ok(0);
    }

    let readings = surface.read_colors(device.device_index, &addresses)?;

    let mut updated = 0;
    for (address, color) in readings {
        match device.leds.iter_mut().find(|led| led.address.id() == address) {
            Some(led) => {
                led.color = Some(color);
                updated += 1;
            }
            None => {
                debug!(device = %device.name, address, "Ignoring colour for unknown address");
            }
        }
    }

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::ProtocolDetails;
    use prism_core::{DeviceKind, LedAddress, LedUnit, RawDeviceDescriptor, RawLedPosition};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSurface {
        written: Mutex<Vec<(usize, Vec<(i32, LedColor)>)>>,
        readings: Vec<(i32, LedColor)>,
    }

    impl ControlSurface for RecordingSurface {
        fn is_controller_running(&self) -> bool {
            true
        }

        fn handshake(&self) -> Result<ProtocolDetails, SurfaceError> {
            Err(SurfaceError::ServerNotFound)
        }

        fn set_control_priority(&self, _level: u8) -> bool {
            true
        }

        fn enumerate_devices(&self) -> Result<Vec<RawDeviceDescriptor>, SurfaceError> {
            Ok(Vec::new())
        }

        fn enumerate_led_positions(
            &self,
            _device_index: usize,
        ) -> Result<Vec<RawLedPosition>, SurfaceError> {
            Ok(Vec::new())
        }

        fn write_colors(
            &self,
            device_index: usize,
            colors: &[(i32, LedColor)],
        ) -> Result<(), SurfaceError> {
            self.written
                .lock()
                .unwrap()
                .push((device_index, colors.to_vec()));
            Ok(())
        }

        fn read_colors(
            &self,
            _device_index: usize,
            _addresses: &[i32],
        ) -> Result<Vec<(i32, LedColor)>, SurfaceError> {
            Ok(self.readings.clone())
        }
    }

    fn fan() -> LogicalDevice {
        let mut device = LogicalDevice::new("QL Fan 1", DeviceKind::Fan, 3);
        device.leds = (0..4)
            .map(|index| LedUnit {
                index,
                address: LedAddress::Plain {
                    id: 200 + index as i32,
                },
                name: format!("Commander PRO {}", index),
                color: None,
            })
            .collect();
        device
    }

    #[test]
    fn test_color_update() {
        let mut device = fan();
        let update = ColorUpdate {
            fill: Some(LedColor::new(0, 0, 255)),
            leds: vec![
                LedAssignment {
                    index: 1,
                    color: LedColor::new(255, 0, 0),
                },
                LedAssignment {
                    index: 9,
                    color: LedColor::new(255, 0, 0),
                },
            ],
        };

        assert_eq!(update.apply(&mut device), 5);
        assert_eq!(device.leds[0].color, Some(LedColor::new(0, 0, 255)));
        assert_eq!(device.leds[1].color, Some(LedColor::new(255, 0, 0)));
    }

    #[test]
    fn test_push_only_colored_leds() {
        let surface = RecordingSurface::default();
        let mut device = fan();
        assert_eq!(push_device(&surface, &device).unwrap(), 0);

        device.leds[2].color = Some(LedColor::new(1, 2, 3));
        assert_eq!(push_device(&surface, &device).unwrap(), 1);

        let written = surface.written.lock().unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0], (3, vec![(202, LedColor::new(1, 2, 3))]));
    }

    #[test]
    fn test_pull_matches_by_address() {
        let surface = RecordingSurface {
            readings: vec![
                (203, LedColor::new(9, 9, 9)),
                (200, LedColor::new(1, 1, 1)),
                (999, LedColor::new(5, 5, 5)),
            ],
            ..Default::default()
        };
        let mut device = fan();

        assert_eq!(pull_device(&surface, &mut device).unwrap(), 2);
        assert_eq!(device.leds[0].color, Some(LedColor::new(1, 1, 1)));
        assert_eq!(device.leds[3].color, Some(LedColor::new(9, 9, 9)));
        assert_eq!(device.leds[1].color, None);
    }
}
