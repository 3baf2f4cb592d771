//! Main collector that turns `/proc` feeds into a [`MetricsSnapshot`].
//!
//! The `Collector` owns the only state that survives between cycles (the CPU
//! baseline) and applies the sentinel policy: a metric that cannot be read
//! this cycle is published with its documented "unavailable" value instead of
//! aborting the whole snapshot.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::collector::alloc::{AllocatorStatsProvider, MemStats, NoAllocatorStats, UNKNOWN_POLICY};
use crate::collector::cpu::CpuUsageCalculator;
use crate::collector::error::SampleError;
use crate::collector::procfs::SystemCollector;
use crate::collector::selector::DeviceSelector;
use crate::collector::traits::FileSystem;
use crate::model::{
    DiskSample, MetricsSnapshot, NetSample, PROCESS_COUNT_UNAVAILABLE, keys,
};

/// Percentage reported when CPU or memory usage cannot be computed.
pub const PERCENT_UNAVAILABLE: f64 = -1.0;

/// Timing information for each collector phase.
///
/// Used for debugging and performance monitoring.
#[derive(Debug, Clone, Default)]
pub struct CollectorTiming {
    /// Total snapshot collection time.
    pub total: Duration,
    /// Time to read `/proc/stat` and update the CPU baseline.
    pub cpu: Duration,
    /// Time to collect `/proc/meminfo`.
    pub meminfo: Duration,
    /// Time to collect `/proc/diskstats`.
    pub diskstats: Duration,
    /// Time to collect `/proc/net/dev`.
    pub netdev: Duration,
    /// Time to collect process and context switch counters.
    pub stat: Duration,
    /// Time spent in the allocator statistics provider.
    pub alloc: Duration,
}

/// Main collector that gathers all system metrics.
pub struct Collector<F: FileSystem> {
    system_collector: SystemCollector<F>,
    cpu: CpuUsageCalculator,
    selector: DeviceSelector,
    alloc_stats: Box<dyn AllocatorStatsProvider>,
    /// Timing information from the last collect_snapshot call.
    last_timing: Option<CollectorTiming>,
}

impl<F: FileSystem> Collector<F> {
    /// Creates a new collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    /// * `selector` - Disk device and network interface to report
    pub fn new(fs: F, proc_path: impl Into<PathBuf>, selector: DeviceSelector) -> Self {
        Self {
            system_collector: SystemCollector::new(fs, proc_path),
            cpu: CpuUsageCalculator::new(),
            selector,
            alloc_stats: Box::new(NoAllocatorStats),
            last_timing: None,
        }
    }

    /// Enables the allocator statistics enrichment block.
    pub fn with_allocator_stats(mut self, provider: impl AllocatorStatsProvider + 'static) -> Self {
        self.alloc_stats = Box::new(provider);
        self
    }

    /// Returns true when the configured proc root exists.
    pub fn proc_available(&self) -> bool {
        self.system_collector.is_available()
    }

    /// Returns timing information from the last collect_snapshot call.
    pub fn last_timing(&self) -> Option<&CollectorTiming> {
        self.last_timing.as_ref()
    }

    /// Collects one complete snapshot.
    ///
    /// Every metric is read exactly once. Failed reads are logged and replaced
    /// by their sentinel; the returned snapshot always has the full key set.
    pub fn collect_snapshot(&mut self) -> MetricsSnapshot {
        let start = Instant::now();
        let mut timing = CollectorTiming::default();

        let t = Instant::now();
        let cpu_usage = self.collect_cpu_usage();
        timing.cpu = t.elapsed();

        let t = Instant::now();
        let memory_usage = self.collect_memory_usage();
        timing.meminfo = t.elapsed();

        let t = Instant::now();
        let disk = self.collect_disk();
        timing.diskstats = t.elapsed();

        let t = Instant::now();
        let net = self.collect_net();
        timing.netdev = t.elapsed();

        let t = Instant::now();
        let running = self
            .system_collector
            .collect_procs_running()
            .unwrap_or_else(|e| {
                warn!("running process count unavailable: {}", e);
                PROCESS_COUNT_UNAVAILABLE
            });
        let ctxt = self
            .system_collector
            .collect_context_switches()
            .unwrap_or_else(|e| {
                warn!("context switch counter unavailable: {}", e);
                0
            });
        timing.stat = t.elapsed();

        let t = Instant::now();
        let alloc = self.alloc_stats.mem_stats();
        if alloc.is_none() {
            debug!("allocator statistics unavailable, using defaults");
        }
        timing.alloc = t.elapsed();

        let snapshot = assemble(cpu_usage, memory_usage, &disk, &net, running, ctxt, alloc.as_ref());

        timing.total = start.elapsed();
        self.last_timing = Some(timing);

        snapshot
    }

    fn collect_cpu_usage(&mut self) -> f64 {
        let result = self
            .system_collector
            .collect_cpu()
            .and_then(|sample| self.cpu.update(sample));

        match result {
            Ok(usage) => usage,
            Err(SampleError::Degenerate(reason)) => {
                debug!("cpu usage not computed: {}", reason);
                PERCENT_UNAVAILABLE
            }
            Err(e) => {
                warn!("cpu usage unavailable: {}", e);
                PERCENT_UNAVAILABLE
            }
        }
    }

    fn collect_memory_usage(&self) -> f64 {
        let result = self.system_collector.collect_meminfo().and_then(|mem| {
            mem.usage_percent()
                .ok_or(SampleError::Degenerate("MemTotal is zero"))
        });

        result.unwrap_or_else(|e| {
            warn!("memory usage unavailable: {}", e);
            PERCENT_UNAVAILABLE
        })
    }

    fn collect_disk(&self) -> DiskSample {
        let device = &self.selector.disk_device;
        match self.system_collector.collect_disk(device) {
            Ok(Some(sample)) => sample,
            Ok(None) => {
                debug!("disk device {} not found in diskstats", device);
                DiskSample::default()
            }
            Err(e) => {
                warn!("disk counters unavailable: {}", e);
                DiskSample::default()
            }
        }
    }

    fn collect_net(&self) -> NetSample {
        let interface = &self.selector.net_interface;
        match self.system_collector.collect_net(interface) {
            Ok(Some(sample)) => sample,
            Ok(None) => {
                debug!("network interface {} not found in net/dev", interface);
                NetSample::default()
            }
            Err(e) => {
                warn!("network counters unavailable: {}", e);
                NetSample::default()
            }
        }
    }
}

/// Builds the snapshot from the individual readings, in publication order.
fn assemble(
    cpu_usage: f64,
    memory_usage: f64,
    disk: &DiskSample,
    net: &NetSample,
    running: i32,
    ctxt: u64,
    alloc: Option<&MemStats>,
) -> MetricsSnapshot {
    let builder = MetricsSnapshot::builder()
        .push(keys::CPU_USAGE_PERCENTAGE, cpu_usage)
        .push(keys::MEMORY_USAGE_PERCENTAGE, memory_usage)
        .push(keys::DISK_READS, disk.reads)
        .push(keys::DISK_WRITES, disk.writes)
        .push(keys::DISK_READ_TIME_SECONDS, disk.read_time_seconds())
        .push(keys::DISK_WRITE_TIME_SECONDS, disk.write_time_seconds())
        .push(keys::NETWORK_BANDWIDTH_RX, net.rx_bytes)
        .push(keys::NETWORK_BANDWIDTH_TX, net.tx_bytes)
        .push(keys::NETWORK_PACKET_RATIO, net.packet_ratio())
        .push(keys::RUNNING_PROCESSES_COUNT, running)
        .push(keys::CONTEXT_SWITCHES_TOTAL, ctxt);

    let builder = match alloc {
        Some(stats) => builder
            .push(keys::CUSTOM_MEMORY_ALLOCATED_BYTES, stats.total_allocated)
            .push(keys::CUSTOM_MEMORY_FREE_BYTES, stats.total_free)
            .push(
                keys::CUSTOM_MEMORY_FRAGMENTATION_PERCENTAGE,
                stats.fragmentation_percentage(),
            )
            .push(
                keys::CUSTOM_MEMORY_LARGEST_FREE_BLOCK_BYTES,
                stats.largest_free_block,
            )
            .push(keys::CUSTOM_MEMORY_POLICY, stats.policy_label())
            .push(keys::CUSTOM_MEMORY_EFFICIENCY_RATIO, stats.efficiency_ratio()),
        None => builder
            .push(keys::CUSTOM_MEMORY_ALLOCATED_BYTES, 0u64)
            .push(keys::CUSTOM_MEMORY_FREE_BYTES, 0u64)
            .push(keys::CUSTOM_MEMORY_FRAGMENTATION_PERCENTAGE, 0.0)
            .push(keys::CUSTOM_MEMORY_LARGEST_FREE_BLOCK_BYTES, 0u64)
            .push(keys::CUSTOM_MEMORY_POLICY, UNKNOWN_POLICY)
            .push(keys::CUSTOM_MEMORY_EFFICIENCY_RATIO, 0.0),
    };

    builder.build()
}
