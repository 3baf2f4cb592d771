//! The unit of publication: one flat, ordered metric mapping per cycle.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Metric names emitted in every snapshot, in assembly order.
pub mod keys {
    pub const CPU_USAGE_PERCENTAGE: &str = "cpu_usage_percentage";
    pub const MEMORY_USAGE_PERCENTAGE: &str = "memory_usage_percentage";
    pub const DISK_READS: &str = "disk_reads";
    pub const DISK_WRITES: &str = "disk_writes";
    pub const DISK_READ_TIME_SECONDS: &str = "disk_read_time_seconds";
    pub const DISK_WRITE_TIME_SECONDS: &str = "disk_write_time_seconds";
    pub const NETWORK_BANDWIDTH_RX: &str = "network_bandwidth_rx";
    pub const NETWORK_BANDWIDTH_TX: &str = "network_bandwidth_tx";
    pub const NETWORK_PACKET_RATIO: &str = "network_packet_ratio";
    pub const RUNNING_PROCESSES_COUNT: &str = "running_processes_count";
    pub const CONTEXT_SWITCHES_TOTAL: &str = "context_switches_total";
    pub const CUSTOM_MEMORY_ALLOCATED_BYTES: &str = "custom_memory_allocated_bytes";
    pub const CUSTOM_MEMORY_FREE_BYTES: &str = "custom_memory_free_bytes";
    pub const CUSTOM_MEMORY_FRAGMENTATION_PERCENTAGE: &str =
        "custom_memory_fragmentation_percentage";
    pub const CUSTOM_MEMORY_LARGEST_FREE_BLOCK_BYTES: &str =
        "custom_memory_largest_free_block_bytes";
    pub const CUSTOM_MEMORY_POLICY: &str = "custom_memory_policy";
    pub const CUSTOM_MEMORY_EFFICIENCY_RATIO: &str = "custom_memory_efficiency_ratio";

    /// Every key, in the order the collector emits them.
    pub const ALL: [&str; 17] = [
        CPU_USAGE_PERCENTAGE,
        MEMORY_USAGE_PERCENTAGE,
        DISK_READS,
        DISK_WRITES,
        DISK_READ_TIME_SECONDS,
        DISK_WRITE_TIME_SECONDS,
        NETWORK_BANDWIDTH_RX,
        NETWORK_BANDWIDTH_TX,
        NETWORK_PACKET_RATIO,
        RUNNING_PROCESSES_COUNT,
        CONTEXT_SWITCHES_TOTAL,
        CUSTOM_MEMORY_ALLOCATED_BYTES,
        CUSTOM_MEMORY_FREE_BYTES,
        CUSTOM_MEMORY_FRAGMENTATION_PERCENTAGE,
        CUSTOM_MEMORY_LARGEST_FREE_BLOCK_BYTES,
        CUSTOM_MEMORY_POLICY,
        CUSTOM_MEMORY_EFFICIENCY_RATIO,
    ];
}

/// A single metric value.
#[derive(Clone, Debug, PartialEq)]
pub enum MetricValue {
    Float(f64),
    Int(i64),
    UInt(u64),
    Text(String),
}

impl MetricValue {
    /// Numeric view of the value; `None` for text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Float(v) => Some(*v),
            MetricValue::Int(v) => Some(*v as f64),
            MetricValue::UInt(v) => Some(*v as f64),
            MetricValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetricValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Float(v)
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Int(v)
    }
}

impl From<i32> for MetricValue {
    fn from(v: i32) -> Self {
        MetricValue::Int(v.into())
    }
}

impl From<u64> for MetricValue {
    fn from(v: u64) -> Self {
        MetricValue::UInt(v)
    }
}

impl From<String> for MetricValue {
    fn from(v: String) -> Self {
        MetricValue::Text(v)
    }
}

impl From<&str> for MetricValue {
    fn from(v: &str) -> Self {
        MetricValue::Text(v.to_string())
    }
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // JSON has no NaN/inf; the collector never produces them, but a
            // custom allocator provider might.
            MetricValue::Float(v) if !v.is_finite() => serializer.serialize_f64(0.0),
            MetricValue::Float(v) => serializer.serialize_f64(*v),
            MetricValue::Int(v) => serializer.serialize_i64(*v),
            MetricValue::UInt(v) => serializer.serialize_u64(*v),
            MetricValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Complete set of metrics produced by one sampling cycle.
///
/// Immutable once built: entries can only be added through
/// [`SnapshotBuilder`]. Serializes as a JSON object whose member order is the
/// insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetricsSnapshot {
    entries: Vec<(&'static str, MetricValue)>,
}

impl MetricsSnapshot {
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::default()
    }

    /// Looks up a metric by name.
    pub fn get(&self, key: &str) -> Option<&MetricValue> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    /// Iterates over `(name, value)` pairs in assembly order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &MetricValue)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// Metric names in assembly order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for MetricsSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Accumulates entries for a [`MetricsSnapshot`].
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    entries: Vec<(&'static str, MetricValue)>,
}

impl SnapshotBuilder {
    /// Appends a metric. A repeated key replaces the earlier value in place,
    /// keeping the original position.
    pub fn push(mut self, key: &'static str, value: impl Into<MetricValue>) -> Self {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    pub fn build(self) -> MetricsSnapshot {
        MetricsSnapshot {
            entries: self.entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_preserves_order() {
        let snapshot = MetricsSnapshot::builder()
            .push(keys::DISK_READS, 1u64)
            .push(keys::CPU_USAGE_PERCENTAGE, 12.5)
            .push(keys::CUSTOM_MEMORY_POLICY, "UNKNOWN")
            .build();

        let names: Vec<_> = snapshot.keys().collect();
        assert_eq!(
            names,
            vec![
                keys::DISK_READS,
                keys::CPU_USAGE_PERCENTAGE,
                keys::CUSTOM_MEMORY_POLICY
            ]
        );
        assert_eq!(snapshot.len(), 3);
    }

    #[test]
    fn test_builder_replaces_duplicate_in_place() {
        let snapshot = MetricsSnapshot::builder()
            .push(keys::DISK_READS, 1u64)
            .push(keys::DISK_WRITES, 2u64)
            .push(keys::DISK_READS, 3u64)
            .build();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.keys().next(), Some(keys::DISK_READS));
        assert_eq!(snapshot.get(keys::DISK_READS), Some(&MetricValue::UInt(3)));
    }

    #[test]
    fn test_serialize_in_insertion_order() {
        let snapshot = MetricsSnapshot::builder()
            .push(keys::NETWORK_PACKET_RATIO, 0.5)
            .push(keys::RUNNING_PROCESSES_COUNT, -1i32)
            .push(keys::CUSTOM_MEMORY_POLICY, "BEST_FIT")
            .build();

        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(
            json,
            r#"{"network_packet_ratio":0.5,"running_processes_count":-1,"custom_memory_policy":"BEST_FIT"}"#
        );
    }

    #[test]
    fn test_non_finite_float_serializes_as_zero() {
        let snapshot = MetricsSnapshot::builder()
            .push(keys::CUSTOM_MEMORY_EFFICIENCY_RATIO, f64::NAN)
            .build();
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, r#"{"custom_memory_efficiency_ratio":0.0}"#);
    }

    #[test]
    fn test_metric_value_views() {
        assert_eq!(MetricValue::Int(-1).as_f64(), Some(-1.0));
        assert_eq!(MetricValue::UInt(7).as_f64(), Some(7.0));
        assert_eq!(MetricValue::Text("x".into()).as_f64(), None);
        assert_eq!(MetricValue::Text("x".into()).as_str(), Some("x"));
    }
}
