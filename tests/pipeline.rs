// End-to-end tests: /proc feeds -> Collector -> Publisher -> sink file.

use std::fs;
use std::path::Path;

use hostpulse::collector::{Collector, DeviceSelector, MemStats, MockFs, RealFs};
use hostpulse::model::{MetricsSnapshot, keys};
use hostpulse::publisher::{PipeSink, Publisher};
use serde_json::Value;
use tempfile::TempDir;

/// Writes a minimal proc tree under `root`.
fn write_proc_tree(root: &Path, cpu_line: &str) {
    fs::create_dir_all(root.join("net")).unwrap();
    fs::write(
        root.join("meminfo"),
        "MemTotal:       8000000 kB\nMemFree:        1000000 kB\nMemAvailable:   6000000 kB\n",
    )
    .unwrap();
    fs::write(
        root.join("stat"),
        format!("{cpu_line}\nctxt 42000\nbtime 1700000000\nprocs_running 5\nprocs_blocked 1\n"),
    )
    .unwrap();
    fs::write(
        root.join("diskstats"),
        "   8       0 sda 100 0 2000 1500 50 0 0 1000 2500 300 4000\n",
    )
    .unwrap();
    fs::write(
        root.join("net/dev"),
        "Inter-|   Receive                                                |  Transmit\n \
         face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed\n  \
         eth0: 5000 50 0 0 0 0 0 0 2500 25 0 0 0 0 0 0\n",
    )
    .unwrap();
}

fn published_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

fn assert_matches_snapshot(decoded: &Value, snapshot: &MetricsSnapshot) {
    let object = decoded.as_object().expect("record is a JSON object");
    assert_eq!(object.len(), snapshot.len());

    for (key, value) in snapshot.iter() {
        let json = &object[key];
        match value.as_f64() {
            Some(expected) => {
                let actual = json.as_f64().unwrap();
                assert!((actual - expected).abs() < 1e-9, "{key}: {actual} != {expected}");
            }
            None => assert_eq!(json.as_str(), value.as_str(), "{key}"),
        }
    }
}

#[test]
fn test_mock_pipeline_round_trip() {
    let dir = TempDir::new().unwrap();
    let sink = dir.path().join("monitor_pipe");

    let fs = MockFs::typical_system();
    let mut collector = Collector::new(fs.clone(), "/proc", DeviceSelector::default());
    let publisher = Publisher::new(PipeSink::new(&sink));

    fs.set_cpu_line("cpu 100 0 100 700 0 0 0 0");
    let first = collector.collect_snapshot();
    assert!(publisher.publish_or_log(&first));

    fs.set_cpu_line("cpu 110 0 110 780 0 0 0 0");
    let second = collector.collect_snapshot();
    assert!(publisher.publish_or_log(&second));

    let lines = published_lines(&sink);
    assert_eq!(lines.len(), 2);

    let decoded: Value = serde_json::from_str(&lines[1]).unwrap();
    assert_matches_snapshot(&decoded, &second);
    assert_eq!(decoded[keys::CPU_USAGE_PERCENTAGE], 20.0);
    assert_eq!(decoded[keys::MEMORY_USAGE_PERCENTAGE], 75.0);
    assert_eq!(decoded[keys::CUSTOM_MEMORY_POLICY], "UNKNOWN");
}

#[test]
fn test_record_preserves_key_order() {
    let dir = TempDir::new().unwrap();
    let sink = dir.path().join("monitor_pipe");

    let mut collector = Collector::new(MockFs::typical_system(), "/proc", DeviceSelector::default());
    Publisher::new(PipeSink::new(&sink))
        .publish(&collector.collect_snapshot())
        .unwrap();

    let line = &published_lines(&sink)[0];
    let positions: Vec<usize> = keys::ALL
        .iter()
        .map(|key| line.find(&format!("\"{key}\":")).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{line}");
}

#[test]
fn test_real_fs_against_directory_tree() {
    let dir = TempDir::new().unwrap();
    let proc_root = dir.path().join("proc");
    let sink = dir.path().join("out.jsonl");

    write_proc_tree(&proc_root, "cpu  100 0 100 700 0 0 0 0 0 0");
    let mut collector = Collector::new(RealFs::new(), &proc_root, DeviceSelector::default());
    let publisher = Publisher::new(PipeSink::new(&sink));

    assert!(collector.proc_available());
    let snapshot = collector.collect_snapshot();
    assert!(publisher.publish_or_log(&snapshot));

    let decoded: Value = serde_json::from_str(&published_lines(&sink)[0]).unwrap();
    assert_matches_snapshot(&decoded, &snapshot);
    assert_eq!(decoded[keys::MEMORY_USAGE_PERCENTAGE], 25.0);
    assert_eq!(decoded[keys::DISK_READS], 2000);
    assert_eq!(decoded[keys::DISK_WRITES], 1000);
    assert_eq!(decoded[keys::DISK_READ_TIME_SECONDS], 1.5);
    assert_eq!(decoded[keys::DISK_WRITE_TIME_SECONDS], 2.5);
    assert_eq!(decoded[keys::NETWORK_BANDWIDTH_RX], 5000);
    assert_eq!(decoded[keys::NETWORK_BANDWIDTH_TX], 2500);
    assert_eq!(decoded[keys::NETWORK_PACKET_RATIO], 0.5);
    assert_eq!(decoded[keys::RUNNING_PROCESSES_COUNT], 5);
    assert_eq!(decoded[keys::CONTEXT_SWITCHES_TOTAL], 42000);
}

#[test]
fn test_unavailable_proc_still_publishes_full_record() {
    let dir = TempDir::new().unwrap();
    let sink = dir.path().join("out.jsonl");

    let mut collector = Collector::new(
        RealFs::new(),
        dir.path().join("no-such-proc"),
        DeviceSelector::default(),
    );
    let snapshot = collector.collect_snapshot();
    Publisher::new(PipeSink::new(&sink)).publish(&snapshot).unwrap();

    let decoded: Value = serde_json::from_str(&published_lines(&sink)[0]).unwrap();
    assert_eq!(decoded.as_object().unwrap().len(), keys::ALL.len());
    assert_eq!(decoded[keys::CPU_USAGE_PERCENTAGE], -1.0);
    assert_eq!(decoded[keys::MEMORY_USAGE_PERCENTAGE], -1.0);
    assert_eq!(decoded[keys::RUNNING_PROCESSES_COUNT], -1);
    assert_eq!(decoded[keys::CONTEXT_SWITCHES_TOTAL], 0);
}

#[test]
fn test_allocator_enrichment_is_published() {
    let dir = TempDir::new().unwrap();
    let sink = dir.path().join("out.jsonl");

    let provider = || {
        Some(MemStats {
            total_allocated: 600,
            total_free: 400,
            fragmentation: 0.1,
            largest_free_block: 128,
            best_fit_count: 4,
            ..MemStats::default()
        })
    };
    let mut collector = Collector::new(MockFs::typical_system(), "/proc", DeviceSelector::default())
        .with_allocator_stats(provider);
    Publisher::new(PipeSink::new(&sink))
        .publish(&collector.collect_snapshot())
        .unwrap();

    let decoded: Value = serde_json::from_str(&published_lines(&sink)[0]).unwrap();
    assert_eq!(decoded[keys::CUSTOM_MEMORY_ALLOCATED_BYTES], 600);
    assert_eq!(decoded[keys::CUSTOM_MEMORY_FREE_BYTES], 400);
    assert_eq!(decoded[keys::CUSTOM_MEMORY_LARGEST_FREE_BLOCK_BYTES], 128);
    assert_eq!(decoded[keys::CUSTOM_MEMORY_POLICY], "BEST_FIT");
    assert_eq!(decoded[keys::CUSTOM_MEMORY_EFFICIENCY_RATIO], 0.4);
    let fragmentation = decoded[keys::CUSTOM_MEMORY_FRAGMENTATION_PERCENTAGE]
        .as_f64()
        .unwrap();
    assert!((fragmentation - 10.0).abs() < 1e-9);
}

#[test]
fn test_captured_proc_tree_replays_through_mock_fs() {
    let dir = TempDir::new().unwrap();
    let proc_root = dir.path().join("proc");
    write_proc_tree(&proc_root, "cpu  100 0 100 700 0 0 0 0 0 0");

    let mut live = Collector::new(RealFs::new(), &proc_root, DeviceSelector::default());
    let mut replay = Collector::new(
        MockFs::from_snapshot(&proc_root).unwrap(),
        "/proc",
        DeviceSelector::default(),
    );

    assert!(replay.proc_available());
    assert_eq!(replay.collect_snapshot(), live.collect_snapshot());
}
