//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc` filesystem states
//! for testing various system conditions.

use super::filesystem::MockFs;

/// `/proc/net/dev` header lines.
const NET_DEV_HEADER: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
";

impl MockFs {
    /// Creates a typical system with `sda` and `eth0` present.
    pub fn typical_system() -> Self {
        let fs = Self::new();

        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       16000000 kB
MemFree:         2000000 kB
MemAvailable:    4000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapCached:            0 kB
SwapTotal:       4096000 kB
SwapFree:        4096000 kB
",
        );
        fs.add_file(
            "/proc/stat",
            "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
cpu0 2500 125 750 20000 250 50 25 0 0 0
cpu1 2500 125 750 20000 250 50 25 0 0 0
cpu2 2500 125 750 20000 250 50 25 0 0 0
cpu3 2500 125 750 20000 250 50 25 0 0 0
intr 1000000 50 0 0 0 0 0 0 0 1 0 0 0 100 0 0 1000
ctxt 500000
btime 1700000000
processes 10000
procs_running 2
procs_blocked 0
",
        );
        fs.add_file(
            "/proc/diskstats",
            "\
   8       0 sda 12345 100 987654 5000 6789 50 0 456789 3000 4000 8000 0 0 0 0
   8       1 sda1 10000 80 800000 4000 5000 40 0 400000 2500 3500 6500 0 0 0 0
 259       0 nvme0n1 50000 200 2000000 10000 30000 150 5 1500000 8000 15000 18000 0 0 0 0
",
        );
        fs.add_file(
            "/proc/net/dev",
            format!(
                "{NET_DEV_HEADER}\
    lo: 12345678     9876    0    0    0     0          0         0 12345678     9876    0    0    0     0       0          0
  eth0: 987654321   654321    5   10    0     0          0       100 123456789   456789    2    5    0     0       0          0
"
            ),
        );

        fs
    }

    /// Creates a system where the network interface has never received a packet.
    pub fn silent_network() -> Self {
        let fs = Self::typical_system();
        fs.add_file(
            "/proc/net/dev",
            format!(
                "{NET_DEV_HEADER}\
  eth0:        0        0    0    0    0     0          0         0     4096       12    0    0    0     0       0          0
"
            ),
        );
        fs
    }

    /// Creates a system whose disk and network feeds lack the default
    /// `sda`/`eth0` targets.
    pub fn foreign_devices() -> Self {
        let fs = Self::typical_system();
        fs.add_file(
            "/proc/diskstats",
            " 259       0 nvme0n1 50000 200 2000000 10000 30000 150 5 1500000 8000 15000 18000 0 0 0 0\n",
        );
        fs.add_file(
            "/proc/net/dev",
            format!(
                "{NET_DEV_HEADER}\
 wlp3s0: 1000 10 0 0 0 0 0 0 2000 20 0 0 0 0 0 0
"
            ),
        );
        fs
    }

    /// Creates a system with an empty `/proc`: every feed is unavailable.
    pub fn empty_proc() -> Self {
        Self::new()
    }

    /// Creates a system where every feed exists but is malformed.
    pub fn corrupted() -> Self {
        let fs = Self::new();
        fs.add_file("/proc/meminfo", "MemFree: 100 kB\n");
        fs.add_file("/proc/stat", "cpu  1 2 3\nintr 5\n");
        fs.add_file("/proc/diskstats", "not a diskstats line\n");
        fs.add_file("/proc/net/dev", "only one header\n");
        fs
    }

    /// Replaces the aggregate `cpu` line of `/proc/stat`, keeping the
    /// process and context switch counters of the typical system.
    pub fn set_cpu_line(&self, cpu_line: &str) {
        self.add_file(
            "/proc/stat",
            format!("{cpu_line}\nctxt 500000\nprocs_running 2\nprocs_blocked 0\n"),
        );
    }
}
