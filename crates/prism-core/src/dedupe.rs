//! Display name deduplication

use std::collections::HashMap;

use tracing::debug;

use crate::device::LogicalDevice;

/// Give every device in a group of equally named devices a `" (k)"` suffix
///
/// Order is preserved and `k` is the 1-based position within the group, so
/// the first member is renamed too. Passes repeat until no two names collide,
/// which covers suffixed names clashing with names that already carried one.
pub fn dedupe_names(mut devices: Vec<LogicalDevice>) -> Vec<LogicalDevice> {
    loop {
        let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, device) in devices.iter().enumerate() {
            groups.entry(device.name.clone()).or_default().push(i);
        }

        let mut renamed = false;
        for (name, members) in groups {
            if members.len() < 2 {
                continue;
            }
            debug!(name = %name, count = members.len(), "Deduplicating device names");
            for (k, i) in members.into_iter().enumerate() {
                devices[i].name = format!("{} ({})", name, k + 1);
            }
            renamed = true;
        }

        if !renamed {
            return devices;
        }
    }
}
