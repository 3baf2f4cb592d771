//! Which block device and network interface the collector reports.

use serde::{Deserialize, Serialize};

/// Default block device when none is configured.
pub const DEFAULT_DISK_DEVICE: &str = "sda";
/// Default network interface when none is configured.
pub const DEFAULT_NET_INTERFACE: &str = "eth0";

/// Fixed disk/interface selection supplied at construction.
///
/// There is no discovery: the first feed line naming the configured device or
/// interface wins and the rest of the feed is not read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSelector {
    /// Device name as it appears in `/proc/diskstats` (e.g. `sda`, `nvme0n1p5`).
    pub disk_device: String,
    /// Interface name as it appears in `/proc/net/dev` (e.g. `eth0`, `wlp3s0`).
    pub net_interface: String,
}

impl DeviceSelector {
    pub fn new(disk_device: impl Into<String>, net_interface: impl Into<String>) -> Self {
        Self {
            disk_device: disk_device.into(),
            net_interface: net_interface.into(),
        }
    }
}

impl Default for DeviceSelector {
    fn default() -> Self {
        Self::new(DEFAULT_DISK_DEVICE, DEFAULT_NET_INTERFACE)
    }
}
