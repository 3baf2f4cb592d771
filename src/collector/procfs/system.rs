//! System collector for gathering global system metrics from `/proc/`.

use crate::collector::error::SampleError;
use crate::collector::procfs::parser::{
    ParseError, parse_context_switches, parse_cpu_total, parse_diskstats, parse_meminfo,
    parse_net_dev, parse_procs_running,
};
use crate::collector::traits::FileSystem;
use crate::model::{CpuSample, DiskSample, MemSample, NetSample};
use std::path::PathBuf;

/// Collects system-wide counters from `/proc/`.
///
/// Every call reads its feed afresh; nothing is cached between calls.
pub struct SystemCollector<F: FileSystem> {
    fs: F,
    proc_path: PathBuf,
}

impl<F: FileSystem> SystemCollector<F> {
    /// Creates a new system collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
        }
    }

    /// Returns true when the proc root exists.
    pub fn is_available(&self) -> bool {
        self.fs.exists(&self.proc_path)
    }

    fn read(&self, relative: &str) -> Result<String, SampleError> {
        let path = self.proc_path.join(relative);
        self.fs
            .read_to_string(&path)
            .map_err(|source| SampleError::SourceUnavailable { path, source })
    }

    /// Collects memory totals from `/proc/meminfo`.
    pub fn collect_meminfo(&self) -> Result<MemSample, SampleError> {
        let content = self.read("meminfo")?;
        Ok(parse_meminfo(&content)?)
    }

    /// Collects the aggregate CPU counters from `/proc/stat`.
    pub fn collect_cpu(&self) -> Result<CpuSample, SampleError> {
        let content = self.read("stat")?;
        Ok(parse_cpu_total(&content)?)
    }

    /// Collects the counters of one block device from `/proc/diskstats`.
    ///
    /// `Ok(None)` means the feed was readable but does not list the device.
    pub fn collect_disk(&self, device: &str) -> Result<Option<DiskSample>, SampleError> {
        let content = self.read("diskstats")?;
        Ok(parse_diskstats(&content, device))
    }

    /// Collects the counters of one interface from `/proc/net/dev`.
    ///
    /// `Ok(None)` means the feed was readable but does not list the interface.
    pub fn collect_net(&self, interface: &str) -> Result<Option<NetSample>, SampleError> {
        let content = self.read("net/dev")?;
        Ok(parse_net_dev(&content, interface))
    }

    /// Collects the number of runnable processes from `/proc/stat`.
    pub fn collect_procs_running(&self) -> Result<i32, SampleError> {
        let content = self.read("stat")?;
        parse_procs_running(&content)
            .ok_or_else(|| ParseError::new("procs_running not found in stat").into())
    }

    /// Collects the cumulative context switch counter from `/proc/stat`.
    pub fn collect_context_switches(&self) -> Result<u64, SampleError> {
        let content = self.read("stat")?;
        parse_context_switches(&content)
            .ok_or_else(|| ParseError::new("ctxt not found in stat").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    #[test]
    fn test_collect_meminfo() {
        let fs = MockFs::typical_system();
        let collector = SystemCollector::new(fs, "/proc");

        let info = collector.collect_meminfo().unwrap();

        assert_eq!(info.total_kb, 16000000);
        assert_eq!(info.available_kb, 4000000);
    }

    #[test]
    fn test_collect_cpu() {
        let fs = MockFs::typical_system();
        let collector = SystemCollector::new(fs, "/proc");

        let cpu = collector.collect_cpu().unwrap();

        assert_eq!(cpu.user, 10000);
        assert_eq!(cpu.idle, 80000);
    }

    #[test]
    fn test_collect_disk() {
        let fs = MockFs::typical_system();
        let collector = SystemCollector::new(fs, "/proc");

        let sda = collector.collect_disk("sda").unwrap().unwrap();
        assert_eq!(sda.reads, 987654);
        assert_eq!(sda.read_time, 5000);
        assert_eq!(sda.writes, 456789);
        assert_eq!(sda.write_time, 3000);

        assert!(collector.collect_disk("vdb").unwrap().is_none());
    }

    #[test]
    fn test_collect_net() {
        let fs = MockFs::typical_system();
        let collector = SystemCollector::new(fs, "/proc");

        let eth0 = collector.collect_net("eth0").unwrap().unwrap();
        assert_eq!(eth0.rx_bytes, 987654321);
        assert_eq!(eth0.rx_packets, 654321);
        assert_eq!(eth0.tx_bytes, 123456789);
        assert_eq!(eth0.tx_packets, 456789);

        assert!(collector.collect_net("wlp3s0").unwrap().is_none());
    }

    #[test]
    fn test_collect_stat_counters() {
        let fs = MockFs::typical_system();
        let collector = SystemCollector::new(fs, "/proc");

        assert_eq!(collector.collect_procs_running().unwrap(), 2);
        assert_eq!(collector.collect_context_switches().unwrap(), 500000);
    }

    #[test]
    fn test_missing_feeds_are_source_unavailable() {
        let collector = SystemCollector::new(MockFs::empty_proc(), "/proc");

        let err = collector.collect_meminfo().unwrap_err();
        match err {
            SampleError::SourceUnavailable { path, .. } => {
                assert_eq!(path, PathBuf::from("/proc/meminfo"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            collector.collect_net("eth0"),
            Err(SampleError::SourceUnavailable { .. })
        ));
        assert!(!collector.is_available());
    }

    #[test]
    fn test_corrupted_feeds_are_parse_errors() {
        let collector = SystemCollector::new(MockFs::corrupted(), "/proc");

        assert!(matches!(
            collector.collect_meminfo(),
            Err(SampleError::Parse(_))
        ));
        assert!(matches!(collector.collect_cpu(), Err(SampleError::Parse(_))));
        assert!(matches!(
            collector.collect_procs_running(),
            Err(SampleError::Parse(_))
        ));
        assert!(matches!(
            collector.collect_context_switches(),
            Err(SampleError::Parse(_))
        ));
        assert!(collector.collect_disk("sda").unwrap().is_none());
        assert!(collector.collect_net("eth0").unwrap().is_none());
    }

    #[test]
    fn test_custom_proc_root() {
        let fs = MockFs::new();
        fs.add_file("/host/proc/stat", "ctxt 42\n");
        let collector = SystemCollector::new(fs, "/host/proc");

        assert_eq!(collector.collect_context_switches().unwrap(), 42);
        assert!(collector.is_available());
    }
}
