//! hostpulsed - host metrics sampler daemon.
//!
//! Samples /proc at a fixed interval and publishes every snapshot as one JSON
//! line to a named pipe.

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(target_os = "linux")]
use hostpulse::collector::RealFs;
#[cfg(not(target_os = "linux"))]
use hostpulse::collector::mock::MockFs;
use hostpulse::collector::selector::{DEFAULT_DISK_DEVICE, DEFAULT_NET_INTERFACE};
use hostpulse::collector::{Collector, DeviceSelector, FileSystem, JemallocStats};
use hostpulse::config::{
    DEFAULT_INTERVAL_SECS, DEFAULT_PROC_PATH, DEFAULT_SINK_PATH, SamplerConfig,
};
use hostpulse::publisher::{PipeSink, Publisher, Sink, StdoutSink};

/// Host metrics sampler daemon.
#[derive(Parser, Debug)]
#[command(name = "hostpulsed", about = "Host metrics sampler daemon", version)]
struct Args {
    /// Sampling interval in seconds.
    #[arg(short, long, env = "HOSTPULSE_INTERVAL", default_value_t = DEFAULT_INTERVAL_SECS)]
    interval: u64,

    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, env = "HOSTPULSE_PROC_PATH", default_value = DEFAULT_PROC_PATH)]
    proc_path: PathBuf,

    /// Block device reported from /proc/diskstats.
    #[arg(long, env = "HOSTPULSE_DISK_DEVICE", default_value = DEFAULT_DISK_DEVICE)]
    disk_device: String,

    /// Network interface reported from /proc/net/dev.
    #[arg(long, env = "HOSTPULSE_NET_INTERFACE", default_value = DEFAULT_NET_INTERFACE)]
    net_interface: String,

    /// Named pipe (or file) that receives one JSON line per snapshot.
    #[arg(long, env = "HOSTPULSE_SINK", default_value = DEFAULT_SINK_PATH)]
    sink: PathBuf,

    /// Collect and publish a single snapshot, then exit.
    #[arg(long)]
    once: bool,

    /// Print snapshots to stdout instead of writing the sink.
    #[arg(long)]
    stdout: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig {
            proc_path: self.proc_path.clone(),
            selector: DeviceSelector::new(&self.disk_device, &self.net_interface),
            sink_path: self.sink.clone(),
            interval: Duration::from_secs(self.interval),
        }
    }
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) -> anyhow::Result<()> {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("hostpulsed={}", level).parse()?)
        .add_directive(format!("hostpulse={}", level).parse()?);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet)?;

    let config = args.sampler_config();
    config.validate().context("invalid configuration")?;

    info!("hostpulsed {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: interval={}s, proc={}, disk={}, net={}, sink={}",
        config.interval.as_secs(),
        config.proc_path.display(),
        config.selector.disk_device,
        config.selector.net_interface,
        if args.stdout {
            "<stdout>".to_string()
        } else {
            config.sink_path.display().to_string()
        }
    );

    #[cfg(target_os = "linux")]
    let fs = RealFs::new();
    #[cfg(not(target_os = "linux"))]
    let fs = MockFs::new();

    let collector = Collector::new(fs, &config.proc_path, config.selector.clone())
        .with_allocator_stats(JemallocStats::new());
    if !collector.proc_available() {
        warn!(
            "{} does not exist, all metrics will report sentinels",
            config.proc_path.display()
        );
    }

    if args.stdout {
        run(collector, Publisher::new(StdoutSink), &config, args.once)
    } else {
        run(
            collector,
            Publisher::new(PipeSink::new(&config.sink_path)),
            &config,
            args.once,
        )
    }
}

fn run<F: FileSystem, S: Sink>(
    mut collector: Collector<F>,
    publisher: Publisher<S>,
    config: &SamplerConfig,
    once: bool,
) -> anyhow::Result<()> {
    if once {
        let snapshot = collector.collect_snapshot();
        if !publisher.publish_or_log(&snapshot) {
            bail!("snapshot was not delivered to {}", publisher.sink().describe());
        }
        return Ok(());
    }

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    info!("Starting sampling loop");

    let mut snapshot_count: u64 = 0;
    let mut delivered_count: u64 = 0;

    while running.load(Ordering::SeqCst) {
        let snapshot = collector.collect_snapshot();
        snapshot_count += 1;

        if let Some(timing) = collector.last_timing() {
            debug!(
                "Snapshot #{} collected in {:?} (cpu={:?}, meminfo={:?}, diskstats={:?}, netdev={:?}, stat={:?}, alloc={:?})",
                snapshot_count,
                timing.total,
                timing.cpu,
                timing.meminfo,
                timing.diskstats,
                timing.netdev,
                timing.stat,
                timing.alloc
            );
        }

        if publisher.publish_or_log(&snapshot) {
            delivered_count += 1;
        }

        // Log delivery stats every 60 snapshots
        if snapshot_count.is_multiple_of(60) {
            info!(
                "Delivery stats: {} of {} snapshots published",
                delivered_count, snapshot_count
            );
        }

        // Sleep with periodic checks for shutdown signal
        let sleep_interval = Duration::from_millis(100);
        let mut remaining = config.interval;
        while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
            let sleep_time = remaining.min(sleep_interval);
            std::thread::sleep(sleep_time);
            remaining = remaining.saturating_sub(sleep_time);
        }
    }

    info!(
        "Shutdown complete: {} snapshots collected, {} published",
        snapshot_count, delivered_count
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_defaults_map_to_default_config() {
        let args = Args::parse_from(["hostpulsed"]);
        assert_eq!(args.disk_device, DEFAULT_DISK_DEVICE);
        assert_eq!(args.net_interface, DEFAULT_NET_INTERFACE);
        assert_eq!(args.sampler_config(), SamplerConfig::default());
        assert!(!args.once);
        assert!(!args.stdout);
    }

    #[test]
    fn args_override_targets() {
        let args = Args::parse_from([
            "hostpulsed",
            "--interval",
            "2",
            "--disk-device",
            "nvme0n1",
            "--net-interface",
            "wlp3s0",
            "--sink",
            "/run/metrics.pipe",
            "--once",
        ]);
        let config = args.sampler_config();
        assert_eq!(config.interval, Duration::from_secs(2));
        assert_eq!(config.selector, DeviceSelector::new("nvme0n1", "wlp3s0"));
        assert_eq!(config.sink_path, PathBuf::from("/run/metrics.pipe"));
        assert!(args.once);
    }

    #[test]
    fn zero_interval_fails_validation() {
        let args = Args::parse_from(["hostpulsed", "--interval", "0"]);
        assert!(args.sampler_config().validate().is_err());
    }
}
