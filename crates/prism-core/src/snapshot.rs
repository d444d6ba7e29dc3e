//! Topology snapshot files
//!
//! A snapshot is a recorded list of raw descriptors, written as TOML
//! (`[[device]]` tables) or JSON (either `{"device": [...]}` or a bare array).

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::raw::RawDeviceDescriptor;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to parse TOML snapshot: {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("Failed to serialize snapshot: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Failed to parse JSON snapshot: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A recorded vendor topology
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologySnapshot {
    #[serde(default, rename = "device")]
    pub devices: Vec<RawDeviceDescriptor>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonSnapshot {
    Wrapped(TopologySnapshot),
    List(Vec<RawDeviceDescriptor>),
}

impl TopologySnapshot {
    pub fn new(devices: Vec<RawDeviceDescriptor>) -> Self {
        Self { devices }
    }

    pub fn from_toml(content: &str) -> Result<Self, SnapshotError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json(content: &str) -> Result<Self, SnapshotError> {
        Ok(match serde_json::from_str(content)? {
            JsonSnapshot::Wrapped(snapshot) => snapshot,
            JsonSnapshot::List(devices) => Self { devices },
        })
    }

    /// Load a snapshot, picking the format from the file extension
    pub fn from_file(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        }
    }

    pub fn to_toml(&self) -> Result<String, SnapshotError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn to_file(&self, path: &Path) -> Result<(), SnapshotError> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{ChannelDeviceType, VendorDeviceType};
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
[[device]]
index = 0
device_type = "keyboard"
model = "K70 RGB MK.2"

[[device.led_position]]
led_id = 12
top = 40.0
left = 10.0

[[device]]
index = 1
device_type = "commander_pro"
caps = 3
model = "Commander PRO"

[[device.channel]]
index = 0

[[device.channel.sub_device]]
kind = "fan_ql"
led_count = 34
"#;

    #[test]
    fn test_parse_toml() {
        let snapshot = TopologySnapshot::from_toml(SAMPLE).unwrap();
        assert_eq!(snapshot.devices.len(), 2);

        let kb = &snapshot.devices[0];
        assert_eq!(kb.device_type, VendorDeviceType::Keyboard);
        assert!(kb.has_lighting());
        assert_eq!(kb.led_positions[0].led_id, 12);

        let hub = &snapshot.devices[1];
        assert_eq!(hub.channels[0].sub_devices[0].kind, ChannelDeviceType::FanQl);
    }

    #[test]
    fn test_parse_json_list() {
        let json = r#"[{"index": 0, "device_type": "mouse", "caps": 0, "model": "M65 RGB"}]"#;
        let snapshot = TopologySnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.devices.len(), 1);
        assert!(!snapshot.devices[0].has_lighting());
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();

        let toml_path = temp_dir.path().join("topology.toml");
        std::fs::write(&toml_path, SAMPLE).unwrap();
        assert_eq!(TopologySnapshot::from_file(&toml_path).unwrap().devices.len(), 2);

        let json_path = temp_dir.path().join("topology.json");
        std::fs::write(&json_path, r#"{"device": []}"#).unwrap();
        assert!(TopologySnapshot::from_file(&json_path).unwrap().devices.is_empty());
    }

    #[test]
    fn test_invalid_content() {
        assert!(matches!(
            TopologySnapshot::from_toml("[[device]]\nindex = \"x\""),
            Err(SnapshotError::TomlError(_))
        ));
        assert!(matches!(
            TopologySnapshot::from_file(Path::new("/nonexistent/topology.toml")),
            Err(SnapshotError::IoError(_))
        ));
    }
}
