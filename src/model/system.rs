//! Raw samples read from the `/proc` filesystem.
//!
//! These structures hold the counters exactly as the kernel reports them.
//! Derived values (percentages, ratios, unit conversions) are computed by
//! the helper methods below or by the collector when a snapshot is assembled.

use serde::{Deserialize, Serialize};

/// Running-process count reported when `/proc/stat` cannot be read.
///
/// No real system reports a negative count, so `-1` is unambiguous.
pub const PROCESS_COUNT_UNAVAILABLE: i32 = -1;

/// Aggregate CPU time counters from the `cpu` line of `/proc/stat`.
///
/// Source: `/proc/stat`
///
/// All values are cumulative clock ticks (jiffies) since boot and never
/// decrease unless the host reboots or a counter wraps.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct CpuSample {
    /// Time spent in user mode.
    /// Source: `/proc/stat` column 1
    pub user: u64,

    /// Time spent in user mode with low priority (nice).
    /// Source: `/proc/stat` column 2
    pub nice: u64,

    /// Time spent in kernel mode.
    /// Source: `/proc/stat` column 3
    pub system: u64,

    /// Time spent idle.
    /// Source: `/proc/stat` column 4
    pub idle: u64,

    /// Time waiting for I/O to complete.
    /// Source: `/proc/stat` column 5
    pub iowait: u64,

    /// Time servicing hardware interrupts.
    /// Source: `/proc/stat` column 6
    pub irq: u64,

    /// Time servicing software interrupts.
    /// Source: `/proc/stat` column 7
    pub softirq: u64,

    /// Time stolen by the hypervisor for other guests.
    /// Source: `/proc/stat` column 8
    pub steal: u64,
}

impl CpuSample {
    /// Ticks spent doing nothing useful: `idle + iowait`.
    pub fn idle_total(&self) -> u64 {
        self.idle.saturating_add(self.iowait)
    }

    /// Ticks spent doing work: `user + nice + system + irq + softirq + steal`.
    pub fn non_idle(&self) -> u64 {
        [
            self.user,
            self.nice,
            self.system,
            self.irq,
            self.softirq,
            self.steal,
        ]
        .iter()
        .fold(0u64, |acc, v| acc.saturating_add(*v))
    }

    /// All ticks accounted for by the eight buckets.
    pub fn total(&self) -> u64 {
        self.idle_total().saturating_add(self.non_idle())
    }

    /// Returns true for the zero-initialized baseline.
    pub fn is_zero(&self) -> bool {
        self.total() == 0
    }
}

/// Memory totals from `/proc/meminfo`, in kilobytes.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct MemSample {
    /// Source: `MemTotal:` line.
    pub total_kb: u64,
    /// Source: `MemAvailable:` line.
    pub available_kb: u64,
}

impl MemSample {
    /// Percentage of memory in use, `100 * (total - available) / total`.
    ///
    /// Returns `None` when the total is zero. Available memory larger than
    /// the total (never seen on a sane kernel) is reported as 0% used.
    pub fn usage_percent(&self) -> Option<f64> {
        if self.total_kb == 0 {
            return None;
        }
        let used = self.total_kb.saturating_sub(self.available_kb);
        Some(used as f64 / self.total_kb as f64 * 100.0)
    }
}

/// Counters for one block device from `/proc/diskstats`.
///
/// Token positions are 0-based, counting the major number as token 0.
///
/// The all-zero default is what the collector reports when the configured
/// device is missing or the feed is unreadable.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct DiskSample {
    /// Sectors read.
    /// Source: `/proc/diskstats` token 5
    pub reads: u64,

    /// Sectors written.
    /// Source: `/proc/diskstats` token 10
    pub writes: u64,

    /// Time spent reading (ms).
    /// Source: `/proc/diskstats` token 6
    pub read_time: u64,

    /// Time spent writing (ms).
    /// Source: `/proc/diskstats` token 11
    pub write_time: u64,
}

impl DiskSample {
    /// Read time converted from milliseconds to seconds.
    pub fn read_time_seconds(&self) -> f64 {
        self.read_time as f64 / 1000.0
    }

    /// Write time converted from milliseconds to seconds.
    pub fn write_time_seconds(&self) -> f64 {
        self.write_time as f64 / 1000.0
    }
}

/// Counters for one network interface from `/proc/net/dev`.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct NetSample {
    /// Bytes received.
    pub rx_bytes: u64,
    /// Packets received.
    pub rx_packets: u64,
    /// Bytes transmitted.
    pub tx_bytes: u64,
    /// Packets transmitted.
    pub tx_packets: u64,
}

impl NetSample {
    /// Transmitted/received packet ratio, `0.0` when nothing was received.
    pub fn packet_ratio(&self) -> f64 {
        if self.rx_packets == 0 {
            return 0.0;
        }
        self.tx_packets as f64 / self.rx_packets as f64
    }
}
