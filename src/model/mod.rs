//! Data model: raw `/proc` samples and the published snapshot.

mod snapshot;
mod system;

pub use snapshot::{MetricValue, MetricsSnapshot, SnapshotBuilder, keys};
pub use system::{CpuSample, DiskSample, MemSample, NetSample, PROCESS_COUNT_UNAVAILABLE};
